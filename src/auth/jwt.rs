use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, error::AuthError, state::AppState};

/// Signs and verifies session credentials with a shared HS256 secret.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_days } = &state.config.jwt;
        Self::new(secret, Duration::from_secs(u64::from(*ttl_days) * 24 * 60 * 60))
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, email: &str) -> anyhow::Result<String> {
        self.issue_at(email, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, email: &str, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(email = %email, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry with no leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            }
        })?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn make_keys() -> JwtKeys {
        let (state, _) = AppState::fake(Environment::Development);
        JwtKeys::from_ref(&state)
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.issue("a@x.com").expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn expiry_is_one_year_out() {
        let keys = make_keys();
        let token = keys.issue("a@x.com").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 365 * 24 * 60 * 60);
    }

    #[test]
    fn longest_configurable_ttl_issues_and_verifies() {
        let (mut state, _) = AppState::fake(Environment::Development);
        let mut config = (*state.config).clone();
        config.jwt.ttl_days = 3650;
        state.config = std::sync::Arc::new(config);

        let keys = JwtKeys::from_ref(&state);
        let claims = keys.verify(&keys.issue("a@x.com").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3650 * 24 * 60 * 60);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let issued = OffsetDateTime::now_utc() - TimeDuration::days(366);
        let token = keys.issue_at("a@x.com", issued).unwrap();
        assert_eq!(keys.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn verify_rejects_token_expired_by_one_second() {
        let keys = JwtKeys::new("test-secret", Duration::from_secs(60));
        let issued = OffsetDateTime::now_utc() - TimeDuration::seconds(61);
        let token = keys.issue_at("a@x.com", issued).unwrap();
        assert_eq!(keys.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn verify_rejects_foreign_secret() {
        let keys = make_keys();
        let foreign = JwtKeys::new("someone-else", Duration::from_secs(3600));
        let token = foreign.issue("a@x.com").unwrap();
        assert_eq!(keys.verify(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn verify_rejects_swapped_payload() {
        let keys = make_keys();
        let victim = keys.issue("victim@x.com").unwrap();
        let attacker = keys.issue("attacker@x.com").unwrap();

        let victim_parts: Vec<&str> = victim.split('.').collect();
        let attacker_parts: Vec<&str> = attacker.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            victim_parts[0], victim_parts[1], attacker_parts[2]
        );
        assert_eq!(keys.verify(&forged).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys();
        assert_eq!(keys.verify("").unwrap_err(), AuthError::InvalidToken);
        assert_eq!(keys.verify("not.a.jwt").unwrap_err(), AuthError::InvalidToken);
    }
}
