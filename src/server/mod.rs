pub mod handlers;
mod types;

pub use types::{ErrorResponse, HealthResponse, PreviewResponse};

use crate::{
    Result, config::Config, invocation::Invoker, records::SqlRecordStore,
    transport::HttpTransport,
};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/templates/:template/records/:id/generations",
            post(handlers::generate),
        )
        .route(
            "/templates/:template/records/:id/preview",
            post(handlers::preview),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Initialize record store
    let db_path = std::env::var("RECORDS_DB_PATH")
        .unwrap_or_else(|_| config.server.database_path.clone());
    let store = SqlRecordStore::new(&db_path).await?;

    let transport = HttpTransport::new(config.endpoint.clone())?;

    let invoker = Invoker::new(
        Arc::new(transport),
        Arc::new(store),
        config.templates.clone(),
    );

    let app = router(AppState {
        invoker: Arc::new(invoker),
    });

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
