use crate::state::AppState;
use axum::Router;

mod claims;
pub mod cookie;
mod dto;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod jwt;

pub fn router() -> Router<AppState> {
    handlers::session_routes()
}
