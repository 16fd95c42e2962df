// Phases only move forward: waiting, placement, playing, gameOver

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use super::error::GameError;
use super::grid::{Cell, Dimensions};
use super::{placement, shot};
use crate::models::{
    Board, Catalog, FireShot, Game, GameId, NewGame, Phase, PlaceVessel, Placement, PlayerId,
    Role, Seat, Shot, ShotResult, VesselId,
};

// Writes the store persists after a successful call. The game row is always rewritten.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    SeatTaken(Seat),
    BoardOpened(PlayerId),
    VesselPlaced { player_id: PlayerId, placement: Placement },
    BoardPrepared(PlayerId),
    ShotFired { target: PlayerId, shot: Shot },
    VesselSunk { player_id: PlayerId, vessel_id: VesselId },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShotReport {
    // Owner of the board that was fired upon
    pub target: PlayerId,
    pub shot: Shot,
    pub sunk: Option<VesselId>,
    pub phase: Phase,
    pub turn: Option<PlayerId>,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacementReport {
    pub placement: Placement,
    pub prepared: bool,
    pub phase: Phase,
}

#[derive(Debug, Clone)]
pub struct Match {
    game: Game,
    boards: Vec<Board>,
    journal: Vec<Change>,
}

impl Match {
    pub fn open(settings: &NewGame, owner: PlayerId, cpu: Option<PlayerId>) -> Result<Self, GameError> {
        let dims = Dimensions::new(settings.width, settings.height)?;
        if cpu == Some(owner) {
            return Err(GameError::AlreadySeated);
        }
        let opponent = match (settings.multiplayer, cpu) {
            (false, Some(id)) => Some(Seat { player_id: id, role: Role::Cpu }),
            (false, None) => return Err(GameError::OpponentBoardNotFound),
            (true, _) => None,
        };

        let game = Game {
            id: 0,
            width: dims.width(),
            height: dims.height(),
            multiplayer: settings.multiplayer,
            phase: if opponent.is_some() { Phase::Placement } else { Phase::Waiting },
            owner,
            opponent,
            turn: Some(owner),
            winner: None,
            created: Utc::now(),
            started: None,
            finished: None,
        };
        let boards = game.seats().iter().map(|s| Board::new(0, s.player_id, dims)).collect();

        Ok(Self { game, boards, journal: Vec::new() })
    }

    pub fn restore(game: Game, boards: Vec<Board>) -> Self {
        Self { game, boards, journal: Vec::new() }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn id(&self) -> GameId {
        self.game.id
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, player: PlayerId) -> Option<&Board> {
        self.boards.iter().find(|b| b.player_id == player)
    }

    fn board_mut(&mut self, player: PlayerId) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.player_id == player)
    }

    pub fn take_journal(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.journal)
    }

    pub(crate) fn assign_id(&mut self, id: GameId) {
        self.game.id = id;
        for board in &mut self.boards {
            board.set_game_id(id);
        }
    }

    pub fn join(&mut self, player: PlayerId) -> Result<(), GameError> {
        if self.game.is_seated(player) {
            return Err(GameError::AlreadySeated);
        }
        if !self.game.multiplayer || self.game.phase != Phase::Waiting || self.game.opponent.is_some() {
            return Err(GameError::GameNotJoinable);
        }

        let seat = Seat { player_id: player, role: Role::Human };
        self.game.opponent = Some(seat);
        self.game.phase = Phase::Placement;
        self.boards.push(Board::new(self.game.id, player, self.game.dimensions()));
        self.journal.push(Change::SeatTaken(seat));
        self.journal.push(Change::BoardOpened(player));

        info!("Player {} joined game {}, placement started", player, self.game.id);
        Ok(())
    }

    // Both boards prepared starts the shooting
    pub fn place(
        &mut self,
        catalog: &Catalog,
        player: PlayerId,
        request: &PlaceVessel,
    ) -> Result<PlacementReport, GameError> {
        if self.game.phase != Phase::Placement {
            return Err(GameError::WrongPhase);
        }
        if !self.game.is_seated(player) {
            return Err(GameError::NotAPlayer);
        }
        let vessel = catalog.get(request.vessel).ok_or(GameError::UnknownVessel)?;
        let board = self.board(player).ok_or(GameError::NotAPlayer)?;
        let placement = placement::validate(board, vessel, request.span())?;

        // Validated, from here on we write
        let game_id = self.game.id;
        let board = self.board_mut(player).ok_or(GameError::NotAPlayer)?;
        board.push_placement(placement.clone());
        let prepared = placement::is_complete(board, catalog);
        board.prepared = prepared;

        self.journal.push(Change::VesselPlaced { player_id: player, placement: placement.clone() });
        debug!("Vessel {} placed on board of player {} in game {}", vessel.id, player, game_id);

        if prepared {
            self.journal.push(Change::BoardPrepared(player));
            info!("Board of player {} in game {} is prepared", player, game_id);
            if self.boards.len() == 2 && self.boards.iter().all(|b| b.prepared) {
                self.game.phase = Phase::Playing;
                self.game.started = Some(Utc::now());
                info!("Game {} moved to playing, turn: {:?}", game_id, self.game.turn);
            }
        }

        Ok(PlacementReport { placement, prepared, phase: self.game.phase })
    }

    // Check order: seat, phase, turn, coordinate syntax, bounds, then duplicates
    pub fn fire(&mut self, shooter: PlayerId, request: &FireShot) -> Result<ShotReport, GameError> {
        if !self.game.is_seated(shooter) {
            return Err(GameError::NotAPlayer);
        }
        match self.game.phase {
            Phase::Playing => {}
            Phase::GameOver => return Err(GameError::GameOver),
            _ => return Err(GameError::WrongPhase),
        }
        if self.game.turn != Some(shooter) {
            return Err(GameError::NotYourTurn);
        }
        let row = shot::parse_coordinate(&request.row)?;
        let col = shot::parse_coordinate(&request.col)?;

        let target = self.game.opponent_of(shooter).ok_or(GameError::OpponentBoardNotFound)?;
        let board = self.board(target).ok_or(GameError::OpponentBoardNotFound)?;
        let cell = board.dimensions().cell(row, col).ok_or(GameError::CellOutOfBounds)?;
        if board.is_shot(cell) {
            return Err(GameError::CellAlreadyShot);
        }

        let resolution = shot::resolve(board, cell);
        Ok(self.commit_shot(shooter, target, cell, resolution))
    }

    fn commit_shot(
        &mut self,
        shooter: PlayerId,
        target: PlayerId,
        cell: Cell,
        resolution: shot::Resolution,
    ) -> ShotReport {
        let game_id = self.game.id;
        let shot = Shot {
            shooter,
            row: cell.row,
            col: cell.col,
            result: resolution.result,
            impact: resolution.impact,
            fired_at: Utc::now(),
        };

        let mut sunk = None;
        let mut remaining = 0;
        if let Some(board) = self.board_mut(target) {
            board.push_shot(shot.clone());
            if resolution.sunk {
                if let Some(vessel_id) = resolution.impact {
                    board.sink(vessel_id);
                    sunk = Some(vessel_id);
                }
            }
            remaining = board.alive_count();
        }

        self.journal.push(Change::ShotFired { target, shot: shot.clone() });
        if let Some(vessel_id) = sunk {
            self.journal.push(Change::VesselSunk { player_id: target, vessel_id });
            info!("Player {} sank vessel {} of player {} in game {}", shooter, vessel_id, target, game_id);
        }

        if remaining == 0 {
            self.game.phase = Phase::GameOver;
            self.game.winner = Some(shooter);
            self.game.finished = Some(Utc::now());
            info!("Game {} is over, winner: {}", game_id, shooter);
        } else if resolution.result == ShotResult::Miss {
            self.game.turn = Some(target);
        }
        debug!(
            "Shot by {} at ({}, {}) in game {}: {:?}",
            shooter, cell.row, cell.col, game_id, resolution.result
        );

        ShotReport {
            target,
            shot,
            sunk,
            phase: self.game.phase,
            turn: self.game.turn,
            winner: self.game.winner,
        }
    }
}
