use std::collections::HashSet;

use super::error::GameError;
use super::grid::{Cell, Span};
use crate::models::{Board, Catalog, Placement, Vessel};

// Nothing is written here, the caller stores the returned placement
pub fn validate(board: &Board, vessel: &Vessel, span: Span) -> Result<Placement, GameError> {
    if board.placement(vessel.id).is_some() {
        return Err(GameError::VesselAlreadyPlaced);
    }
    if !span.is_axis_aligned() || span.len() != u64::from(vessel.size) {
        return Err(GameError::InvalidPlacement);
    }

    let span = span.normalized();
    let dims = board.dimensions();
    let (start, end) = match (dims.cell(span.ri, span.ci), dims.cell(span.rf, span.cf)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(GameError::InvalidPlacement),
    };

    let placement = Placement {
        vessel_id: vessel.id,
        ri: start.row,
        ci: start.col,
        rf: end.row,
        cf: end.col,
        alive: true,
    };

    let occupied: HashSet<Cell> = board.placements.iter().flat_map(|p| p.footprint()).collect();
    if placement.footprint().iter().any(|c| occupied.contains(c)) {
        return Err(GameError::VesselOverlap);
    }

    Ok(placement)
}

pub fn is_complete(board: &Board, catalog: &Catalog) -> bool {
    !catalog.is_empty() && catalog.vessels().iter().all(|v| board.placement(v.id).is_some())
}
