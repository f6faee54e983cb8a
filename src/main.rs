use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_site::api::router;
use course_site::config::AppConfig;
use course_site::services::CourseStore;
use course_site::state::{AppState, StoreHandle};
use course_site::storage::Backend;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_site=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    info!("using storage {:?} (key: {})", config.storage, config.store_key);

    let backend = Backend::open(&config.storage, &config.store_key).await?;
    let store = Arc::new(CourseStore::load(backend.storage()));

    let _log_changes = store.subscribe(|data| {
        info!(
            "course data changed: {} announcements, {} deadlines",
            data.announcements.len(),
            data.deadlines.len()
        );
    });

    let state = AppState {
        store: StoreHandle::initialized(store.clone()),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = backend.flush().await {
        warn!("failed to flush pending writes: {}", e);
    }
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
    }
}
