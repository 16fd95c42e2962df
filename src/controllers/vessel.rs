use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use log::info;

use crate::errors::CustomError;
use crate::store::Store;
use crate::AppState;

//handler for the vessel catalog. this request can be done without any auth
pub async fn list_vessels<S: Store>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, CustomError> {
    info!("vessels request");

    Ok((StatusCode::OK, Json(state.referee.vessels())))
}
