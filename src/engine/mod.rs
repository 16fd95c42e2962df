pub mod cpu;
pub mod error;
pub mod grid;
pub mod placement;
pub mod shot;
pub mod state;
pub mod view;

pub use error::GameError;
pub use state::{Change, Match, PlacementReport, ShotReport};
pub use view::{project, GameView};
