use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use atelier_auth::Principal;
use atelier_core::{Action, ResourceKind};

use crate::app::AppState;
use crate::errors;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami - echo the restored principal.
pub async fn whoami(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(serde_json::json!({
        "subject": principal.subject,
        "kind": principal.kind,
        "display_name": principal.display_name,
        "authorities": principal.authorities.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PermissionQuery {
    pub resource: String,
    pub action: String,
}

/// GET /whoami/permissions?resource=order&action=read - probe a permission
/// for the current principal.
///
/// An unknown resource or action name is a caller bug, not a denial: it is
/// logged loudly and rejected outright so a typo can never read as a grant.
pub async fn permissions(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PermissionQuery>,
) -> axum::response::Response {
    let kind: ResourceKind = match query.resource.parse() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::error!("permission probe with unknown resource kind: {e}");
            return errors::json_error(StatusCode::BAD_REQUEST, "unknown_resource_kind", e.to_string());
        }
    };
    let action: Action = match query.action.parse() {
        Ok(action) => action,
        Err(e) => {
            tracing::error!("permission probe with unknown action: {e}");
            return errors::json_error(StatusCode::BAD_REQUEST, "unknown_action", e.to_string());
        }
    };

    let allowed = state.evaluator.check(&principal, kind, action);
    Json(serde_json::json!({
        "resource": kind,
        "action": action,
        "allowed": allowed,
    }))
    .into_response()
}
