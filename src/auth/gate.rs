use tracing::warn;

use super::extractors::AuthUser;
use crate::{
    error::AppError,
    users::{repo::UserRepository, repo_types::{Role, User}},
};

/// Looks up the caller's stored record on every call and checks its role.
///
/// A valid session for an email with no record is refused, never treated as
/// anonymous.
pub async fn require_role(
    users: &dyn UserRepository,
    caller: &AuthUser,
    expected: Role,
) -> Result<User, AppError> {
    let Some(user) = users.find_by_email(&caller.email).await? else {
        warn!(email = %caller.email, "session for unknown account");
        return Err(AppError::Forbidden("no account for this session".into()));
    };

    if user.role != expected {
        warn!(email = %caller.email, role = %user.role, required = %expected, "role check failed");
        return Err(AppError::Forbidden(format!("{} role required", expected)));
    }

    Ok(user)
}

/// Self-service operations only act on the caller's own account.
pub fn require_same_account(caller: &AuthUser, email: &str) -> Result<(), AppError> {
    if caller.email != email {
        warn!(caller = %caller.email, target = %email, "cross-account attempt");
        return Err(AppError::Forbidden(
            "cannot act on another account".into(),
        ));
    }
    Ok(())
}
