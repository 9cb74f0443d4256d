//! Request filters: session restore and authentication enforcement.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use atelier_auth::{Principal, TokenError};

use crate::app::AppState;
use crate::errors;

/// Resurrect a security context from the session cookie, if one is present
/// and still good.
///
/// This filter never fails the request itself. No cookie, a bad or expired
/// token, or a subject that no longer authenticates all leave the request
/// unauthenticated and let downstream enforcement decide.
pub async fn session_restore(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = cookie_value(req.headers(), &state.config.cookie_name) {
        match state.codec.decode(&token) {
            Ok(claims) => match state.router.rederive_by_subject(&claims.sub) {
                Ok(principal) => {
                    tracing::trace!(subject = %principal.subject, "session restored");
                    req.extensions_mut().insert(principal);
                }
                Err(e) => {
                    tracing::debug!("session subject no longer authenticates: {e}");
                }
            },
            Err(TokenError::Expired) => tracing::trace!("session cookie expired"),
            Err(TokenError::Invalid) => tracing::trace!("session cookie rejected"),
        }
    }
    next.run(req).await
}

/// Reject requests that reached a protected route without a principal.
pub async fn require_principal(req: Request, next: Next) -> Response {
    if req.extensions().get::<Principal>().is_none() {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        );
    }
    next.run(req).await
}

/// Pull a named cookie out of the `Cookie` header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(COOKIE)?.to_str().ok()?;
    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}
