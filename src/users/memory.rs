use std::{collections::HashMap, sync::Arc};

use axum::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::UserRepository,
    repo_types::{NewProfile, PromotionStatus, Role, UpsertOutcome, User, UserUpdate},
};

/// Process-local identity store keyed by email.
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record as-is.
    pub async fn insert(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn upsert_on_login(
        &self,
        profile: &NewProfile,
        now: OffsetDateTime,
    ) -> anyhow::Result<UpsertOutcome> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get_mut(&profile.email) {
            existing.last_logged_in = now;
            return Ok(UpsertOutcome {
                created: false,
                user: existing.clone(),
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            photo_url: profile.photo_url.clone(),
            role: Role::Customer,
            status: PromotionStatus::None,
            created_at: now,
            last_logged_in: now,
        };
        users.insert(user.email.clone(), user.clone());
        Ok(UpsertOutcome {
            created: true,
            user,
        })
    }

    async fn update_fields(
        &self,
        email: &str,
        update: UserUpdate,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(email) else {
            return Ok(None);
        };
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        Ok(Some(user.clone()))
    }

    async fn list_except(&self, email: &str) -> anyhow::Result<Vec<User>> {
        let users = self.users.read().await;
        let mut out: Vec<User> = users
            .values()
            .filter(|u| u.email != email)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn profile(email: &str) -> NewProfile {
        NewProfile {
            email: email.into(),
            name: Some("Fern".into()),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_touches_login_time() {
        let repo = InMemoryUserRepository::new();
        let t0 = datetime!(2024-03-01 10:00 UTC);
        let t1 = datetime!(2024-03-02 10:00 UTC);

        let first = repo.upsert_on_login(&profile("a@x.com"), t0).await.unwrap();
        assert!(first.created);
        assert_eq!(first.user.role, Role::Customer);
        assert_eq!(first.user.status, PromotionStatus::None);

        let mut other = profile("a@x.com");
        other.name = Some("Renamed".into());
        let second = repo.upsert_on_login(&other, t1).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.name.as_deref(), Some("Fern"));
        assert_eq!(second.user.created_at, t0);
        assert_eq!(second.user.last_logged_in, t1);
    }

    #[tokio::test]
    async fn update_fields_leaves_unset_fields_alone() {
        let repo = InMemoryUserRepository::new();
        repo.upsert_on_login(&profile("a@x.com"), datetime!(2024-03-01 10:00 UTC))
            .await
            .unwrap();

        let updated = repo
            .update_fields(
                "a@x.com",
                UserUpdate {
                    role: None,
                    status: Some(PromotionStatus::Requested),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Customer);
        assert_eq!(updated.status, PromotionStatus::Requested);

        let missing = repo
            .update_fields("nobody@x.com", UserUpdate::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_except_skips_caller_and_orders_by_creation() {
        let repo = InMemoryUserRepository::new();
        repo.upsert_on_login(&profile("c@x.com"), datetime!(2024-03-03 10:00 UTC))
            .await
            .unwrap();
        repo.upsert_on_login(&profile("a@x.com"), datetime!(2024-03-01 10:00 UTC))
            .await
            .unwrap();
        repo.upsert_on_login(&profile("b@x.com"), datetime!(2024-03-02 10:00 UTC))
            .await
            .unwrap();

        let emails: Vec<String> = repo
            .list_except("b@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, vec!["a@x.com", "c@x.com"]);
    }
}
