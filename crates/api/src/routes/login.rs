//! Login/logout endpoints — the interactive half of the auth pipeline.

use std::sync::Arc;

use axum::{
    extract::{Extension, Form},
    http::{
        header::{InvalidHeaderValue, REFERER, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use atelier_auth::{AuthError, Credentials};

use crate::app::AppState;
use crate::config::AuthConfig;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Optional so a malformed POST still lands on the failure redirect
    /// instead of an extractor rejection.
    pub email: Option<String>,
    pub password: Option<String>,
    /// One-time verification code for first-login confirmation.
    pub uuid: Option<String>,
    /// Explicit post-login redirect target.
    pub target: Option<String>,
}

/// The three terminal outcomes of a login attempt. Every error path maps
/// onto exactly one of these; the endpoint never surfaces a raw 500.
enum LoginOutcome {
    Success { token: String },
    InvalidCode { replacement: Option<String> },
    Failure,
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match attempt(&state, &form) {
        LoginOutcome::Success { token } => {
            // The cookie is only attached once the token bytes exist; an
            // unbuildable header value degrades to the failure redirect
            // rather than a half-applied response.
            match auth_cookie(&state.config, &token) {
                Ok(cookie) => {
                    let mut response_headers = HeaderMap::new();
                    response_headers.insert(SET_COOKIE, cookie);
                    let target = success_target(&state.config, &headers, form.target.as_deref());
                    (response_headers, Redirect::to(&target)).into_response()
                }
                Err(e) => {
                    tracing::error!("session cookie could not be built: {e}");
                    failure_redirect(&state.config, &headers).into_response()
                }
            }
        }
        LoginOutcome::InvalidCode { replacement } => {
            let code = replacement.unwrap_or_else(|| "notValid".to_string());
            Redirect::to(&format!("{}?uuid={code}", state.config.login_url)).into_response()
        }
        LoginOutcome::Failure => failure_redirect(&state.config, &headers).into_response(),
    }
}

/// Clear the session cookie and send the client back to the login page.
pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_cookie(&state.config) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to(&state.config.login_url)).into_response()
}

fn attempt(state: &AppState, form: &LoginForm) -> LoginOutcome {
    let email = form.email.as_deref().map(str::trim).unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        tracing::debug!("login rejected: missing credentials");
        return LoginOutcome::Failure;
    }

    let mut credentials = Credentials::new(email, password);
    if let Some(code) = form.uuid.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        credentials = credentials.with_code(code);
    }

    match state.router.login(&credentials) {
        Ok(principal) => {
            match state
                .codec
                .encode(&principal.subject, &principal.authorities, Utc::now())
            {
                Ok(token) => LoginOutcome::Success { token },
                Err(e) => {
                    tracing::error!(subject = %principal.subject, "token minting failed: {e}");
                    LoginOutcome::Failure
                }
            }
        }
        Err(AuthError::InvalidCode { replacement }) => LoginOutcome::InvalidCode { replacement },
        Err(e) => {
            tracing::debug!("login failed: {e}");
            LoginOutcome::Failure
        }
    }
}

/// Post-login target: explicit `target` field, else the originating page,
/// else the configured default. A referer pointing back at the login page
/// falls through to the default.
fn success_target(config: &AuthConfig, headers: &HeaderMap, explicit: Option<&str>) -> String {
    if let Some(target) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return target.to_string();
    }
    if let Some(referer) = referer(headers) {
        if !referer.contains(&config.login_url) {
            return referer;
        }
    }
    config.success_url.clone()
}

fn failure_redirect(config: &AuthConfig, headers: &HeaderMap) -> Redirect {
    match referer(headers) {
        Some(referer) => Redirect::to(&referer),
        None => Redirect::to(&config.failure_url),
    }
}

fn referer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REFERER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

// No Max-Age on purpose: the token's own expiry bounds the session, the
// cookie just carries it.
fn auth_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
