use bit_vec::BitVec;
use serde::Serialize;

use super::{GameId, Placement, PlayerId, Shot, VesselId};
use crate::engine::grid::{Cell, Dimensions};

/// One player's side of a game: their fleet and every shot fired at it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Board {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub prepared: bool,
    pub placements: Vec<Placement>,
    pub shots: Vec<Shot>,
    #[serde(skip)]
    dimensions: Dimensions,
    // One bit per cell, set once the cell has been shot
    #[serde(skip)]
    shots_map: BitVec,
}

impl Board {
    pub fn new(game_id: GameId, player_id: PlayerId, dimensions: Dimensions) -> Self {
        Self::restore(game_id, player_id, false, Vec::new(), Vec::new(), dimensions)
    }

    /// Rebuild a board from stored records.
    pub fn restore(
        game_id: GameId,
        player_id: PlayerId,
        prepared: bool,
        placements: Vec<Placement>,
        shots: Vec<Shot>,
        dimensions: Dimensions,
    ) -> Self {
        let mut shots_map = BitVec::from_elem(dimensions.area(), false);
        for shot in &shots {
            if let Some(i) = dimensions.index(shot.cell()) {
                shots_map.set(i, true);
            }
        }
        Self { game_id, player_id, prepared, placements, shots, dimensions, shots_map }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn is_shot(&self, cell: Cell) -> bool {
        self.dimensions
            .index(cell)
            .and_then(|i| self.shots_map.get(i))
            .unwrap_or(false)
    }

    pub fn placement(&self, vessel: VesselId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.vessel_id == vessel)
    }

    pub fn placement_at(&self, cell: Cell) -> Option<&Placement> {
        self.placements.iter().find(|p| p.covers(cell))
    }

    pub fn alive_count(&self) -> usize {
        self.placements.iter().filter(|p| p.alive).count()
    }

    pub(crate) fn push_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    pub(crate) fn push_shot(&mut self, shot: Shot) {
        if let Some(i) = self.dimensions.index(shot.cell()) {
            self.shots_map.set(i, true);
        }
        self.shots.push(shot);
    }

    pub(crate) fn sink(&mut self, vessel: VesselId) {
        if let Some(p) = self.placements.iter_mut().find(|p| p.vessel_id == vessel) {
            p.alive = false;
        }
    }

    pub(crate) fn set_game_id(&mut self, game_id: GameId) {
        self.game_id = game_id;
    }
}
