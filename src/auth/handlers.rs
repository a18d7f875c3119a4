use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{SuccessResponse, TokenRequest},
        jwt::JwtKeys,
    },
    error::AppError,
    state::AppState,
    users::services::normalize_email,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(issue_session))
        .route("/logout", get(logout))
}

#[instrument(skip(state, payload))]
pub async fn issue_session(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<(HeaderMap, Json<SuccessResponse>), AppError> {
    let email = normalize_email(&payload.email)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(&email)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&token, state.config.environment)?,
    );

    info!(email = %email, "session issued");
    Ok((headers, Json(SuccessResponse::ok())))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<SuccessResponse>), AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        clear_session_cookie(state.config.environment)?,
    );
    Ok((headers, Json(SuccessResponse::ok())))
}
