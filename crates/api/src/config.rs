//! Process configuration for the auth pipeline.

use chrono::Duration;

use atelier_auth::{KeyMaterial, KeyMaterialError, TokenCodec};

/// Everything the login/session pipeline reads from the environment.
///
/// Defaults match a local development setup; every value can be overridden
/// through `ATELIER_*` variables.
#[derive(Clone)]
pub struct AuthConfig {
    /// Symmetric signing secret, at least 32 bytes.
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
    pub issuer: String,
    pub audience: String,
    /// Session cookie: no client-side expiry of its own, the token's `exp`
    /// claim decides when the session dies.
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// Login page, used for code-retry and logout redirects.
    pub login_url: String,
    pub success_url: String,
    pub failure_url: String,
    pub bind_addr: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "insecure-dev-secret-0123456789abcdef".to_string(),
            token_ttl_secs: 1800,
            issuer: "atelier.example/".to_string(),
            audience: "atelier.example/internal".to_string(),
            cookie_name: "atelier_auth".to_string(),
            cookie_secure: false,
            login_url: "/login".to_string(),
            success_url: "/".to_string(),
            failure_url: "/login?login=failure".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("ATELIER_SECRET").unwrap_or_else(|_| {
            tracing::warn!("ATELIER_SECRET not set; using insecure dev default");
            defaults.secret.clone()
        });
        Self {
            secret,
            token_ttl_secs: env_i64("ATELIER_TOKEN_TTL_SECS", defaults.token_ttl_secs),
            issuer: env_or("ATELIER_ISSUER", &defaults.issuer),
            audience: env_or("ATELIER_AUDIENCE", &defaults.audience),
            cookie_name: env_or("ATELIER_AUTH_COOKIE", &defaults.cookie_name),
            cookie_secure: std::env::var("ATELIER_COOKIE_SECURE").is_ok_and(|v| v == "1" || v == "true"),
            login_url: env_or("ATELIER_LOGIN_URL", &defaults.login_url),
            success_url: env_or("ATELIER_SUCCESS_URL", &defaults.success_url),
            failure_url: env_or("ATELIER_FAILURE_URL", &defaults.failure_url),
            bind_addr: env_or("ATELIER_BIND_ADDR", &defaults.bind_addr),
        }
    }

    /// Build the token codec this config describes.
    pub fn token_codec(&self) -> Result<TokenCodec, KeyMaterialError> {
        let key = KeyMaterial::hs256(self.secret.as_bytes())?;
        Ok(TokenCodec::new(
            key,
            self.issuer.clone(),
            self.audience.clone(),
            Duration::seconds(self.token_ttl_secs),
        ))
    }
}

// The secret stays out of Debug output.
impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("cookie_name", &self.cookie_name)
            .field("bind_addr", &self.bind_addr)
            .finish_non_exhaustive()
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_i64(var: &str, default: i64) -> i64 {
    match std::env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{var}={raw} is not a number; using {default}");
            default
        }),
        Err(_) => default,
    }
}
