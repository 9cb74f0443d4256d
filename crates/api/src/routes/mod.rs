use axum::{routing::get, Router};

pub mod login;
pub mod orders;
pub mod system;

/// Router for all protected (session-backed) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/whoami/permissions", get(system::permissions))
        .nest("/orders", orders::router())
}
