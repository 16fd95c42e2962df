// Cell markers: 0 open water, vessel id intact segment, negated id hit, MISS miss

use serde::Serialize;

use super::error::GameError;
use super::grid::Orientation;
use super::state::Match;
use crate::models::{Board, Catalog, Game, Player, PlayerId, ShotResult};

pub const EMPTY: i32 = 0;
pub const MISS: i32 = 11;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameView {
    pub game: Game,
    pub player: BoardView,
    pub opponent: Option<BoardView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub id: PlayerId,
    pub username: String,
    pub board: Vec<Vec<i32>>,
    pub placed_ships: Vec<ShipView>,
    pub available_ships: Vec<AvailableShip>,
    pub prepared: bool,
    pub ships_remaining: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShipView {
    #[serde(rename = "type")]
    pub vessel_type: u32,
    pub size: u32,
    pub position: Position,
    pub is_vertical: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableShip {
    #[serde(rename = "type")]
    pub vessel_type: u32,
    pub size: u32,
    pub is_vertical: bool,
}

pub fn project(
    m: &Match,
    catalog: &Catalog,
    players: &[Player],
    observer: PlayerId,
) -> Result<GameView, GameError> {
    let game = m.game();
    if !game.is_seated(observer) {
        return Err(GameError::NotAPlayer);
    }
    let nickname = |id: PlayerId| {
        players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.nickname.clone())
            .unwrap_or_default()
    };

    let own = m.board(observer).ok_or(GameError::NotAPlayer)?;
    let player = project_board(own, catalog, nickname(observer), false);
    let opponent = game
        .opponent_of(observer)
        .and_then(|id| m.board(id))
        .map(|b| project_board(b, catalog, nickname(b.player_id), true));

    Ok(GameView { game: game.clone(), player, opponent })
}

// With fog, intact segments read as open water and only sunk ships are listed
pub fn project_board(board: &Board, catalog: &Catalog, username: String, fog: bool) -> BoardView {
    let dims = board.dimensions();
    let mut matrix = vec![vec![EMPTY; dims.width() as usize]; dims.height() as usize];

    if !fog {
        for p in &board.placements {
            for cell in p.footprint() {
                matrix[cell.row as usize][cell.col as usize] = p.vessel_id as i32;
            }
        }
    }
    for shot in &board.shots {
        if !dims.contains(shot.cell()) {
            continue;
        }
        matrix[shot.row as usize][shot.col as usize] = match (shot.result, shot.impact) {
            (ShotResult::Hit, Some(vessel)) => -(vessel as i32),
            _ => MISS,
        };
    }

    let placed_ships = board
        .placements
        .iter()
        .filter(|p| !fog || !p.alive)
        .map(|p| ShipView {
            vessel_type: p.vessel_id,
            size: p.footprint().len() as u32,
            position: Position { row: p.ri, col: p.ci },
            is_vertical: p.orientation() == Orientation::Vertical,
            alive: p.alive,
        })
        .collect();

    let available_ships = if fog {
        Vec::new()
    } else {
        catalog
            .vessels()
            .iter()
            .filter(|v| board.placement(v.id).is_none())
            .map(|v| AvailableShip { vessel_type: v.id, size: v.size, is_vertical: true })
            .collect()
    };

    BoardView {
        id: board.player_id,
        username,
        board: matrix,
        placed_ships,
        available_ships,
        prepared: board.prepared,
        ships_remaining: board.alive_count(),
    }
}
