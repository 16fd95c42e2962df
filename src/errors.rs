use axum::{http::StatusCode, response::IntoResponse, Json};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

use crate::engine::GameError;
use crate::store::StoreError;

// Custom Errors used in handlers
#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Bad Request")]
    BadRequest,
    #[error("User not Found")]
    UserNotFound,
    #[error("User already exists")]
    UserExists,
    #[error("User deactivated")]
    UserDeactivated,
    #[error("Wrong Password")]
    WrongPassword,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("You are not allowed to do that")]
    Forbidden,
    #[error("You already have the maximum amount of active games on this server")]
    MaxGames,
    #[error("Game not found")]
    GameNotFound,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("{0}")]
    Rule(GameError),
    #[error("Internal Server Error")]
    InternalServerError,
}

impl CustomError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::UserNotFound => "user_not_found",
            Self::UserExists => "user_exists",
            Self::UserDeactivated => "user_deactivated",
            Self::WrongPassword => "wrong_password",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::MaxGames => "max_games",
            Self::GameNotFound => "game_not_found",
            Self::PlayerNotFound => "player_not_found",
            Self::Rule(rule) => rule.kind(),
            Self::InternalServerError => "internal_server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest | Self::UserExists | Self::UserDeactivated => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::GameNotFound | Self::PlayerNotFound => StatusCode::NOT_FOUND,
            Self::WrongPassword | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::Rule(GameError::NotAPlayer) => StatusCode::FORBIDDEN,
            Self::MaxGames => StatusCode::TOO_MANY_REQUESTS,
            Self::Rule(GameError::NotYourTurn | GameError::CellAlreadyShot) => StatusCode::CONFLICT,
            Self::Rule(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<GameError> for CustomError {
    fn from(err: GameError) -> Self {
        CustomError::Rule(err)
    }
}

impl From<StoreError> for CustomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rule(rule) => CustomError::Rule(rule),
            StoreError::GameNotFound(_) => CustomError::GameNotFound,
            StoreError::PlayerNotFound(_) => CustomError::PlayerNotFound,
            StoreError::TooManyGames(player) => {
                warn!("Player {} is at the active game limit", player);
                CustomError::MaxGames
            }
            StoreError::Conflict(_) => CustomError::UserExists,
            other => {
                error!("Storage failure: {}", other);
                CustomError::InternalServerError
            }
        }
    }
}

//implementation of custom errors that are used in handlers
impl IntoResponse for CustomError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (status, Json(json!({"error": self.to_string(), "kind": self.kind()}))).into_response()
    }
}
