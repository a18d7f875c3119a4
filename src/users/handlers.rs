use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::{RoleResponse, UpdateRoleRequest, UpsertUserRequest},
    repo_types::{UpsertOutcome, User},
    services,
};
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::AppError,
    state::AppState,
};

// --- public routers ---

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(upsert_user))
        .route("/user/role/:email", get(get_role))
        .route("/became-seller-request/:email", patch(request_seller))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/user/role/update/:email", patch(update_role))
        .route("/all-users", get(all_users))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn upsert_user(
    State(state): State<AppState>,
    Json(payload): Json<UpsertUserRequest>,
) -> Result<(StatusCode, Json<UpsertOutcome>), AppError> {
    let outcome =
        services::upsert_on_login(state.users.as_ref(), payload.into(), OffsetDateTime::now_utc())
            .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = services::role_of(state.users.as_ref(), &email).await?;
    Ok(Json(RoleResponse { role }))
}

#[instrument(skip(state, caller), fields(caller = %caller.email))]
pub async fn request_seller(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = services::request_seller_promotion(state.users.as_ref(), &caller, &email).await?;
    Ok(Json(user))
}

#[instrument(skip(state, admin, payload), fields(admin = %admin.email))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(email): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<User>, AppError> {
    let user = services::approve_role(state.users.as_ref(), &admin, &email, &payload.role).await?;
    Ok(Json(user))
}

#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn all_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = services::list_users_except(state.users.as_ref(), &admin).await?;
    Ok(Json(users))
}
