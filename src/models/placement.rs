use serde::{Deserialize, Serialize};

use super::VesselId;
use crate::engine::grid::{self, Cell, Orientation, Span};

/// A vessel deployed on a board. Stored normalized, so the start cell never
/// lies after the end cell.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub vessel_id: VesselId,
    pub ri: u32,
    pub ci: u32,
    pub rf: u32,
    pub cf: u32,
    pub alive: bool,
}

impl Placement {
    pub fn origin(&self) -> Cell {
        Cell::new(self.ri, self.ci)
    }

    pub fn end(&self) -> Cell {
        Cell::new(self.rf, self.cf)
    }

    pub fn orientation(&self) -> Orientation {
        grid::orientation(self.ri, self.rf)
    }

    pub fn footprint(&self) -> Vec<Cell> {
        grid::footprint(self.origin(), self.end())
    }

    pub fn covers(&self, cell: Cell) -> bool {
        match self.orientation() {
            Orientation::Vertical => cell.col == self.ci && (self.ri..=self.rf).contains(&cell.row),
            Orientation::Horizontal => cell.row == self.ri && (self.ci..=self.cf).contains(&cell.col),
        }
    }
}

// The struct used for receiving a vessel placement as json
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct PlaceVessel {
    pub vessel: VesselId,
    pub ri: i64,
    pub ci: i64,
    pub rf: i64,
    pub cf: i64,
}

impl PlaceVessel {
    pub fn span(&self) -> Span {
        Span { ri: self.ri, ci: self.ci, rf: self.rf, cf: self.cf }
    }
}
