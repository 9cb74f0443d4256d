use std::sync::Arc;

use atelier_api::config::AuthConfig;
use atelier_api::memory::{identity_record, InMemoryIdentities};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    atelier_observability::init();

    let config = AuthConfig::from_env();
    let identities = Arc::new(InMemoryIdentities::new());

    // Optional dev seed: ATELIER_DEV_SEED="admin@atelier.example:password"
    // creates an enabled staff superuser for local poking.
    if let Ok(seed) = std::env::var("ATELIER_DEV_SEED") {
        match seed.split_once(':') {
            Some((email, password)) => {
                identities.insert_staff(identity_record(email, password, true, &["admin.full"])?);
                tracing::info!(email, "seeded dev staff identity");
            }
            None => tracing::warn!("ATELIER_DEV_SEED must look like email:password; ignoring"),
        }
    }

    let bind_addr = config.bind_addr.clone();
    let app = atelier_api::app::build_app(
        config,
        identities.clone(),
        identities.clone(),
        identities,
    )?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
