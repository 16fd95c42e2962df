use axum::{
    extract::{Path, State, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::info;

use super::caller;
use crate::errors::CustomError;
use crate::models::{GameId, NewGame};
use crate::store::Store;
use crate::AppState;

//handler for creating a new game.
pub async fn new_game<S: Store>(
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
    Json(newgame): Json<NewGame>,
) -> Result<impl IntoResponse, CustomError> {
    info!("new game request");

    //check if user is logged in, bail out if not
    let (player, _) = caller(&state, &bearer).await?;

    let view = state.referee.create_game(&player, newgame).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for joining an existing multiplayer game.
pub async fn join_game<S: Store>(
    Path(game_id): Path<GameId>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Join game request for game {}", game_id);

    let (player, _) = caller(&state, &bearer).await?;

    let view = state.referee.join_game(&player, game_id).await?;
    Ok((StatusCode::OK, Json(view)))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for the state of a game as seen by the caller.
pub async fn get_game<S: Store>(
    Path(game_id): Path<GameId>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Get game request for game {}", game_id);

    let (player, _) = caller(&state, &bearer).await?;

    let view = state.referee.game_view(&player, game_id).await?;
    Ok((StatusCode::OK, Json(view)))
}

//handler for listing the games the caller is seated in.
pub async fn list_games<S: Store>(
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("List games request");

    let (player, _) = caller(&state, &bearer).await?;

    let games = state.referee.games(&player).await?;
    Ok((StatusCode::OK, Json(games)))
}

//handler for deleting a game. Only the owner or an admin may do this.
pub async fn delete_game<S: Store>(
    Path(game_id): Path<GameId>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Delete game request for game {}", game_id);

    let (player, admin) = caller(&state, &bearer).await?;

    state.referee.delete_game(&player, admin, game_id).await?;
    Ok((StatusCode::OK, "Game deleted"))
}

//handler for the players seated in a game.
pub async fn get_players<S: Store>(
    Path(game_id): Path<GameId>,
    State(state): State<AppState<S>>,
    TypedHeader(bearer): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("Players request for game {}", game_id);

    let (player, _) = caller(&state, &bearer).await?;

    let players = state.referee.players(&player, game_id).await?;
    Ok((StatusCode::OK, Json(players)))
}
