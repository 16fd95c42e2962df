use std::collections::BTreeSet;

use serde_json::Value;

use super::error::GameError;
use super::grid::Cell;
use crate::models::{Board, ShotResult, VesselId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub result: ShotResult,
    pub impact: Option<VesselId>,
    // sinks with this shot
    pub sunk: bool,
}

// Read a submitted coordinate. Integers of any magnitude are accepted, those
// past i64 saturate and fail the bounds check later. Anything else is malformed.
pub fn parse_coordinate(value: &Value) -> Result<i64, GameError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Ok(i64::MAX)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
                    .ok_or(GameError::InvalidCoordinates)
            }
        }
        Value::String(s) => parse_integer(s.trim()).ok_or(GameError::InvalidCoordinates),
        _ => Err(GameError::InvalidCoordinates),
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

// Callers must have rejected already shot cells
pub fn resolve(board: &Board, cell: Cell) -> Resolution {
    let struck = board.placements.iter().filter(|p| p.alive).find(|p| p.covers(cell));

    let Some(placement) = struck else {
        return Resolution { result: ShotResult::Miss, impact: None, sunk: false };
    };

    let mut hit_cells: BTreeSet<Cell> = board
        .shots
        .iter()
        .filter(|s| s.result == ShotResult::Hit && s.impact == Some(placement.vessel_id))
        .map(|s| s.cell())
        .collect();
    hit_cells.insert(cell);

    let footprint: BTreeSet<Cell> = placement.footprint().into_iter().collect();

    Resolution {
        result: ShotResult::Hit,
        impact: Some(placement.vessel_id),
        sunk: hit_cells == footprint,
    }
}
