//! Demo order routes — the guarded call-site pattern the rest of the
//! backend follows: resolve the principal, consult the evaluator, 403 on
//! denial.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_auth::Principal;
use atelier_core::{Action, ResourceKind};

use crate::app::AppState;
use crate::errors;

#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub description: String,
    pub placed_by: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderDraft {
    pub description: String,
}

pub fn router() -> Router {
    Router::new().route("/", get(list_orders).post(create_order))
}

fn deny(action: Action) -> axum::response::Response {
    errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        format!("missing permission: order/{action}"),
    )
}

/// GET /orders - requires (order, read).
pub async fn list_orders(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if !state.evaluator.check(&principal, ResourceKind::Order, Action::Read) {
        return deny(Action::Read);
    }

    let orders = state.orders.lock().expect("order store poisoned").clone();
    Json(serde_json::json!({ "orders": orders })).into_response()
}

/// POST /orders - requires (order, create).
pub async fn create_order(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<OrderDraft>,
) -> axum::response::Response {
    if !state.evaluator.check(&principal, ResourceKind::Order, Action::Create) {
        return deny(Action::Create);
    }
    if draft.description.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "description cannot be empty",
        );
    }

    let order = OrderRecord {
        id: Uuid::new_v4(),
        description: draft.description.trim().to_string(),
        placed_by: principal.subject.clone(),
    };
    state
        .orders
        .lock()
        .expect("order store poisoned")
        .push(order.clone());

    (StatusCode::CREATED, Json(order)).into_response()
}
