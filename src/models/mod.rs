pub mod board;
pub mod game;
pub mod placement;
pub mod player;
pub mod shot;
pub mod vessel;

pub type GameId = u32;
pub type PlayerId = u32;
pub type VesselId = u32;

pub use board::Board;
pub use game::{Game, NewGame, Phase, Role, Seat};
pub use placement::{PlaceVessel, Placement};
pub use player::{Account, AuthResponse, Player, SignUp};
pub use shot::{FireShot, Shot, ShotResult};
pub use vessel::{Catalog, Vessel};
