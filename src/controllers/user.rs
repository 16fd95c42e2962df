use axum::{
    extract::{State, TypedHeader},
    headers::{authorization::Basic, Authorization},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::{error, info};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::errors::CustomError;
use crate::models::{AuthResponse, SignUp};
use crate::store::Store;
use crate::AppState;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler logging in. We extract Basic authentication to retrieve username and password. If the password
//checks out we generate and return the JWT Bearer token which has the expiration and role encoded within
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    TypedHeader(basic): TypedHeader<Authorization<Basic>>,
) -> Result<impl IntoResponse, CustomError> {
    info!("login request by user: {}", basic.username());

    // Fetch the account using the username from the basic authentication header
    let account = state
        .referee
        .store()
        .account(basic.username())
        .await?
        .ok_or_else(|| {
            error!("Unknown user {}", basic.username());
            CustomError::UserNotFound
        })?;

    // Check if the account is active, if not, error out
    if !account.active {
        return Err(CustomError::UserDeactivated);
    }

    //Check password hash is equal to stored password hash. if not, error out
    if !verify_password(basic.password(), &account.password_hash) {
        return Err(CustomError::WrongPassword);
    }

    let token = issue_token(&state.jwt_secret, state.token_duration, &account.name, account.admin)?;
    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: state.token_duration,
        }),
    ))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for signing up. Creates the account and the player linked to it.
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn signup<S: Store>(
    State(state): State<AppState<S>>,
    Json(user): Json<SignUp>,
) -> Result<impl IntoResponse, CustomError> {
    info!("signup request");

    let name = user.name.trim();
    if name.is_empty() || user.password.is_empty() {
        return Err(CustomError::BadRequest);
    }

    // Create the password hash
    let password_hash = hash_password(&user.password)?;
    let nickname = user
        .nickname
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(name);

    let player = state.referee.sign_up(name, &password_hash, nickname).await?;
    Ok((StatusCode::CREATED, Json(player)))
}
