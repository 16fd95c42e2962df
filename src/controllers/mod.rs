pub mod board;
pub mod game;
pub mod user;
pub mod vessel;

use axum::headers::{authorization::Bearer, Authorization};

use crate::auth::check_access;
use crate::errors::CustomError;
use crate::models::Player;
use crate::store::Store;
use crate::AppState;

// Resolve the bearer token to the calling player. Also returns the admin flag.
pub(crate) async fn caller<S: Store>(
    state: &AppState<S>,
    bearer: &Authorization<Bearer>,
) -> Result<(Player, bool), CustomError> {
    let (user_name, admin) = check_access(&state.jwt_secret, bearer)?;
    let player = state.referee.identify(&user_name).await?;
    Ok((player, admin))
}
