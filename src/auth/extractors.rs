use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{cookie::token_from_headers, gate::require_role, jwt::JwtKeys};
use crate::{
    error::{AppError, AuthError},
    state::AppState,
    users::repo_types::{Role, User},
};

/// Verified session identity, read from the `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AuthError::Missing)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "session rejected");
            e
        })?;

        Ok(AuthUser {
            email: claims.email,
        })
    }
}

/// Verified session whose stored record has the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        let user = require_role(state.users.as_ref(), &caller, Role::Admin).await?;
        Ok(AdminUser(user))
    }
}
