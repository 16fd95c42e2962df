use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PlayerId, VesselId};
use crate::engine::grid::Cell;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    Miss,
    Hit,
}

impl ShotResult {
    // Storage code, 1 means hit
    pub fn code(&self) -> u8 {
        match self {
            ShotResult::Miss => 0,
            ShotResult::Hit => 1,
        }
    }

    pub fn from_code(code: u8) -> Self {
        if code == 1 {
            ShotResult::Hit
        } else {
            ShotResult::Miss
        }
    }
}

/// A shot recorded against the board it landed on.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Shot {
    pub shooter: PlayerId,
    pub row: u32,
    pub col: u32,
    pub result: ShotResult,
    // Vessel of the placement that was struck
    pub impact: Option<VesselId>,
    pub fired_at: DateTime<Utc>,
}

impl Shot {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

// The struct used for receiving a shot as json. Coordinates stay raw until the
// turn has been checked, malformed ones are a rule violation of their own.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct FireShot {
    #[serde(default)]
    pub row: Value,
    #[serde(default)]
    pub col: Value,
}

impl FireShot {
    pub fn at(cell: Cell) -> Self {
        Self { row: Value::from(cell.row), col: Value::from(cell.col) }
    }
}
