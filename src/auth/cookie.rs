use anyhow::Context;
use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::Environment;

pub const SESSION_COOKIE: &str = "token";

// Issue and clear must carry identical attributes or browsers keep the old cookie.
fn attributes(env: Environment) -> &'static str {
    if env.is_production() {
        "HttpOnly; Secure; SameSite=None; Path=/"
    } else {
        "HttpOnly; SameSite=Strict; Path=/"
    }
}

pub fn session_cookie(token: &str, env: Environment) -> anyhow::Result<HeaderValue> {
    HeaderValue::from_str(&format!("{}={}; {}", SESSION_COOKIE, token, attributes(env)))
        .context("build session cookie")
}

pub fn clear_session_cookie(env: Environment) -> anyhow::Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
        SESSION_COOKIE,
        attributes(env)
    ))
    .context("build clearing cookie")
}

/// Reads the session token from any `Cookie` header on the request.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
