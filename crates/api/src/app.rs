//! HTTP application wiring (axum router + component assembly).

use std::sync::{Arc, Mutex};

use axum::{routing::get, routing::post, Extension, Router};
use tower::ServiceBuilder;

use atelier_auth::{
    AuthenticationRouter, CustomerDirectory, CustomerVerifier, PermissionEvaluator,
    StaffDirectory, StaffVerifier, TokenCodec, VerificationCodes,
};

use crate::config::AuthConfig;
use crate::routes::orders::OrderRecord;
use crate::{middleware, routes};

/// Shared per-process state. Everything here is either immutable after
/// startup or internally synchronized; requests never share mutable
/// authentication state.
pub struct AppState {
    pub config: AuthConfig,
    pub codec: TokenCodec,
    pub router: AuthenticationRouter,
    pub evaluator: PermissionEvaluator,
    /// Demo order store for the guarded routes.
    pub orders: Mutex<Vec<OrderRecord>>,
}

/// Build the full HTTP router.
///
/// The login endpoints and health check are public; everything under the
/// protected subtree passes through session restore and then the
/// require-principal gate.
pub fn build_app(
    config: AuthConfig,
    staff: Arc<dyn StaffDirectory>,
    customers: Arc<dyn CustomerDirectory>,
    codes: Arc<dyn VerificationCodes>,
) -> anyhow::Result<Router> {
    let codec = config.token_codec()?;
    let auth_router = AuthenticationRouter::new(vec![
        Arc::new(StaffVerifier::new(staff)),
        Arc::new(CustomerVerifier::new(customers, codes)),
    ]);

    let state = Arc::new(AppState {
        config,
        codec,
        router: auth_router,
        evaluator: PermissionEvaluator::standard(),
        orders: Mutex::new(Vec::new()),
    });

    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::session_restore,
            ))
            .layer(axum::middleware::from_fn(middleware::require_principal)),
    );

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::login::login))
        .route("/logout", post(routes::login::logout))
        .merge(protected)
        .layer(Extension(state)))
}
