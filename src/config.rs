use serde::Deserialize;

/// Deployment profile; drives the session cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let environment = Environment::from_name(
            &std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        );
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: parse_ttl_days(std::env::var("JWT_TTL_DAYS").ok().as_deref())?,
        };
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );
        Ok(Self {
            database_url,
            environment,
            jwt,
            cors_origins,
        })
    }
}

pub const DEFAULT_TTL_DAYS: u32 = 365;
const MAX_TTL_DAYS: u32 = 3650;

fn parse_ttl_days(raw: Option<&str>) -> anyhow::Result<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_TTL_DAYS);
    };
    let days: i64 = raw
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid JWT_TTL_DAYS {:?}: {}", raw, e))?;
    if !(1..=MAX_TTL_DAYS as i64).contains(&days) {
        anyhow::bail!("JWT_TTL_DAYS must be within 1..={}, got {}", MAX_TTL_DAYS, days);
    }
    Ok(days as u32)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
