use anyhow::Context;
use axum::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::repo_types::{NewProfile, PromotionStatus, Role, UpsertOutcome, User, UserUpdate};

/// Identity store. Constructed once at startup and shared through `AppState`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Create the record on first login, otherwise only bump `last_logged_in`.
    async fn upsert_on_login(
        &self,
        profile: &NewProfile,
        now: OffsetDateTime,
    ) -> anyhow::Result<UpsertOutcome>;

    /// Returns `None` when no record exists for `email`.
    async fn update_fields(&self, email: &str, update: UserUpdate)
        -> anyhow::Result<Option<User>>;

    /// All records except `email`, oldest first.
    async fn list_except(&self, email: &str) -> anyhow::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    user: User,
    inserted: bool,
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, photo_url, role, status, created_at, last_logged_in
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn upsert_on_login(
        &self,
        profile: &NewProfile,
        now: OffsetDateTime,
    ) -> anyhow::Result<UpsertOutcome> {
        // xmax = 0 only for a freshly inserted tuple
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO users (email, name, photo_url, role, status, created_at, last_logged_in)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (email) DO UPDATE
                SET last_logged_in = EXCLUDED.last_logged_in
            RETURNING id, email, name, photo_url, role, status, created_at, last_logged_in,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.photo_url)
        .bind(Role::Customer)
        .bind(PromotionStatus::None)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .context("upsert user on login")?;

        Ok(UpsertOutcome {
            created: row.inserted,
            user: row.user,
        })
    }

    async fn update_fields(
        &self,
        email: &str,
        update: UserUpdate,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET role = COALESCE($2, role),
                   status = COALESCE($3, status)
             WHERE email = $1
            RETURNING id, email, name, photo_url, role, status, created_at, last_logged_in
            "#,
        )
        .bind(email)
        .bind(update.role)
        .bind(update.status)
        .fetch_optional(&self.db)
        .await
        .context("update user fields")?;
        Ok(user)
    }

    async fn list_except(&self, email: &str) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, photo_url, role, status, created_at, last_logged_in
              FROM users
             WHERE email <> $1
             ORDER BY created_at ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(users)
    }
}
