use axum::{
    extract::{Path, State, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::{info, warn};

use super::caller;
use crate::errors::CustomError;
use crate::models::{FireShot, GameId, PlaceVessel, PlayerId};
use crate::store::Store;
use crate::AppState;

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for placing a vessel on a player's board. The caller places on their own
// board, the owner of a game against the CPU may also place for the CPU.
/////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn place_vessel<S: Store>(
    Path((game_id, player_id)): Path<(GameId, PlayerId)>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
    Json(placement): Json<PlaceVessel>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Place vessel request in game {} for player {}", game_id, player_id);

    let (player, _) = caller(&state, &bearer).await?;

    match state.referee.place_vessel(&player, game_id, player_id, placement).await {
        Ok(report) => Ok((StatusCode::CREATED, Json(report))),
        Err(err) => {
            warn!("Placement in game {} refused: {}", game_id, err);
            Err(err)
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for firing at the opponent's board.
/////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn fire_shot<S: Store>(
    Path((game_id, player_id)): Path<(GameId, PlayerId)>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
    Json(shot): Json<FireShot>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Shot request in game {} for player {}", game_id, player_id);

    let (player, _) = caller(&state, &bearer).await?;

    match state.referee.fire(&player, game_id, player_id, shot).await {
        Ok(outcome) => Ok((StatusCode::CREATED, Json(outcome))),
        Err(err) => {
            warn!("Shot in game {} refused: {}", game_id, err);
            Err(err)
        }
    }
}
