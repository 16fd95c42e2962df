use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId};
use crate::engine::grid::Dimensions;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub width: u32,
    pub height: u32,
    pub multiplayer: bool,
    pub phase: Phase,
    pub owner: PlayerId,
    pub opponent: Option<Seat>,
    pub turn: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub created: DateTime<Utc>,
    pub started: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
}

impl Game {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::trusted(self.width, self.height)
    }

    /// Every seat at the table, owner first.
    pub fn seats(&self) -> Vec<Seat> {
        let mut seats = vec![Seat { player_id: self.owner, role: Role::Owner }];
        seats.extend(self.opponent);
        seats
    }

    pub fn seat_of(&self, player: PlayerId) -> Option<Seat> {
        self.seats().into_iter().find(|s| s.player_id == player)
    }

    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.seat_of(player).is_some()
    }

    /// The other side of the table as seen from `player`.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let opponent = self.opponent.map(|s| s.player_id);
        if player == self.owner {
            opponent
        } else if opponent == Some(player) {
            Some(self.owner)
        } else {
            None
        }
    }

    /// The automated player, if this game is played against one.
    pub fn cpu(&self) -> Option<PlayerId> {
        self.opponent.filter(|s| s.role == Role::Cpu).map(|s| s.player_id)
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Waiting,
    Placement,
    Playing,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Placement => "placement",
            Phase::Playing => "playing",
            Phase::GameOver => "gameOver",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Phase::Waiting),
            "placement" => Ok(Phase::Placement),
            "playing" => Ok(Phase::Playing),
            "gameOver" => Ok(Phase::GameOver),
            other => Err(format!("unknown phase {other:?}")),
        }
    }
}

// How a player sits at a game's table
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Human,
    Cpu,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Human => "human",
            Role::Cpu => "cpu",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "human" => Ok(Role::Human),
            "cpu" => Ok(Role::Cpu),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seat {
    pub player_id: PlayerId,
    pub role: Role,
}

// The struct used for a new game
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewGame {
    #[serde(default = "default_side")]
    pub width: i64,
    #[serde(default = "default_side")]
    pub height: i64,
    #[serde(default)]
    pub multiplayer: bool,
}

fn default_side() -> i64 {
    10
}

impl Default for NewGame {
    fn default() -> Self {
        Self { width: default_side(), height: default_side(), multiplayer: false }
    }
}
