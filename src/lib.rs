//! Server-side Battleship: the rules engine, its persistence and the REST
//! surface around it.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod config;
pub mod controllers;
pub mod engine;
pub mod errors;
pub mod models;
pub mod referee;
pub mod store;

use referee::Referee;
use store::Store;

// Shared immutable state
pub struct AppState<S> {
    pub jwt_secret: String,
    pub token_duration: i64,
    pub referee: Arc<Referee<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            jwt_secret: self.jwt_secret.clone(),
            token_duration: self.token_duration,
            referee: Arc::clone(&self.referee),
        }
    }
}

// Define routes
pub fn app<S: Store>(state: AppState<S>) -> Router {
    use controllers::{board, game, user, vessel};

    Router::new()
        .route("/login", get(user::login::<S>))
        .route("/signup", post(user::signup::<S>))
        .route("/vessels", get(vessel::list_vessels::<S>))
        .route("/games", get(game::list_games::<S>).post(game::new_game::<S>))
        .route("/games/:game_id", get(game::get_game::<S>).delete(game::delete_game::<S>))
        .route("/games/:game_id/join", post(game::join_game::<S>))
        .route("/games/:game_id/players", get(game::get_players::<S>))
        .route("/games/:game_id/players/:player_id/vessels", post(board::place_vessel::<S>))
        .route("/games/:game_id/players/:player_id/shots", post(board::fire_shot::<S>))
        .with_state(state)
}
