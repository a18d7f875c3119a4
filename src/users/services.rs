use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    repo::UserRepository,
    repo_types::{NewProfile, PromotionStatus, Role, UpsertOutcome, User, UserUpdate},
};
use crate::{
    auth::{extractors::AuthUser, gate::require_same_account},
    error::AppError,
};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases, then checks the address shape.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput(format!("invalid email: {:?}", raw)));
    }
    Ok(email)
}

pub async fn upsert_on_login(
    users: &dyn UserRepository,
    mut profile: NewProfile,
    now: OffsetDateTime,
) -> Result<UpsertOutcome, AppError> {
    profile.email = normalize_email(&profile.email)?;
    let outcome = users.upsert_on_login(&profile, now).await?;
    if outcome.created {
        info!(email = %outcome.user.email, "account created");
    }
    Ok(outcome)
}

pub async fn role_of(users: &dyn UserRepository, email: &str) -> Result<Role, AppError> {
    let email = normalize_email(email)?;
    users
        .find_by_email(&email)
        .await?
        .map(|u| u.role)
        .ok_or_else(|| AppError::NotFound(format!("no account for {}", email)))
}

/// Marks the caller's own account as waiting for seller approval.
pub async fn request_seller_promotion(
    users: &dyn UserRepository,
    caller: &AuthUser,
    email: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email)?;
    require_same_account(caller, &email)?;

    let current = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no account for {}", email)))?;
    if current.status == PromotionStatus::Verified || current.role != Role::Customer {
        warn!(email = %email, role = %current.role, status = ?current.status, "promotion request refused");
        return Err(AppError::Forbidden(
            "only unverified customers can request seller access".into(),
        ));
    }

    let update = UserUpdate {
        role: None,
        status: Some(PromotionStatus::Requested),
    };
    let user = users
        .update_fields(&email, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no account for {}", email)))?;

    info!(email = %email, "seller promotion requested");
    Ok(user)
}

/// Sets the role and marks the account verified in one update.
pub async fn approve_role(
    users: &dyn UserRepository,
    admin: &User,
    email: &str,
    role: &str,
) -> Result<User, AppError> {
    let role: Role = role.parse()?;
    let email = normalize_email(email)?;

    let update = UserUpdate {
        role: Some(role),
        status: Some(PromotionStatus::Verified),
    };
    let Some(user) = users.update_fields(&email, update).await? else {
        warn!(admin = %admin.email, target = %email, "role update for unknown account");
        return Err(AppError::NotFound(format!("no account for {}", email)));
    };

    info!(admin = %admin.email, target = %email, role = %role, "role updated");
    Ok(user)
}

pub async fn list_users_except(
    users: &dyn UserRepository,
    caller: &User,
) -> Result<Vec<User>, AppError> {
    Ok(users.list_except(&caller.email).await?)
}
