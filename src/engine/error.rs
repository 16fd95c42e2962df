use thiserror::Error;

// Every check runs before the first write
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("Coordinates must be integers")]
    InvalidCoordinates,
    #[error("The opponent has no board in this game")]
    OpponentBoardNotFound,
    #[error("That cell has already been shot")]
    CellAlreadyShot,
    #[error("That cell lies outside the board")]
    CellOutOfBounds,
    #[error("The vessel does not fit that position")]
    InvalidPlacement,
    #[error("That vessel has already been placed on this board")]
    VesselAlreadyPlaced,
    #[error("The vessel overlaps another vessel")]
    VesselOverlap,
    #[error("Unknown vessel type")]
    UnknownVessel,
    #[error("The game is not in the right phase for that")]
    WrongPhase,
    #[error("The game is over")]
    GameOver,
    #[error("You are not a player in this game")]
    NotAPlayer,
    #[error("Board width and height must be between 5 and 200")]
    IllegalBoardSize,
    #[error("The game cannot be joined")]
    GameNotJoinable,
    #[error("You are already seated in this game")]
    AlreadySeated,
}

impl GameError {
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::NotYourTurn => "not_your_turn",
            GameError::InvalidCoordinates => "invalid_coordinates",
            GameError::OpponentBoardNotFound => "opponent_board_not_found",
            GameError::CellAlreadyShot => "cell_already_shot",
            GameError::CellOutOfBounds => "cell_out_of_bounds",
            GameError::InvalidPlacement => "invalid_placement",
            GameError::VesselAlreadyPlaced => "vessel_already_placed",
            GameError::VesselOverlap => "vessel_overlap",
            GameError::UnknownVessel => "unknown_vessel",
            GameError::WrongPhase => "wrong_phase",
            GameError::GameOver => "game_over",
            GameError::NotAPlayer => "not_a_player",
            GameError::IllegalBoardSize => "illegal_board_size",
            GameError::GameNotJoinable => "game_not_joinable",
            GameError::AlreadySeated => "already_seated",
        }
    }
}
