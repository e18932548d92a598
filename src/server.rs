use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    capture,
    config::AppConfig,
    demo,
    docs::{DocumentationSynthesizer, SynthesisSettings},
    handlers::{self, AppState},
    inventory::{self, ApiController, RouteRegistry},
    store::ExchangeStore,
};

/// Delay before the startup snapshot of the route inventory is written.
const SNAPSHOT_DELAY: Duration = Duration::from_secs(5);

/// Start the server
///
/// This function:
/// 1. Opens the exchange store
/// 2. Scans the route inventory from the demo controllers
/// 3. Creates the Axum application with the capture middleware
/// 4. Spawns the inventory snapshot task
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: AppConfig) -> Result<()> {
    let app_state = build_state(&config)?;
    let registry = app_state.registry.clone();

    let app = create_router(app_state.clone(), &config);

    inventory::spawn_snapshot_task(
        registry,
        app_state.synthesizer.doc_directory().to_path_buf(),
        SNAPSHOT_DELAY,
    );

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting apiscribe on {}", addr);
    info!(
        endpoints = app_state.registry.len(),
        log_directory = %config.capture.log_directory,
        doc_directory = %config.docs.doc_directory,
        "Capture pipeline ready"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received, draining connections...");
    })
    .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Builds the shared state: store, scanned inventory, synthesizer. The
/// inventory scan completes here, before any request is served.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let format = config.capture.format()?;
    let store = Arc::new(ExchangeStore::new(
        &config.capture.log_directory,
        format,
        config.capture.replace_latest,
    )?);

    let controllers = demo::controllers();
    let refs: Vec<&dyn ApiController> = controllers.iter().map(|c| c.as_ref()).collect();
    let registry = Arc::new(RouteRegistry::scan(&refs));

    let settings = SynthesisSettings {
        application_name: config.docs.application_name.clone(),
        api_version: config.docs.api_version.clone(),
        api_description: config.docs.api_description.clone(),
        server_port: config.server.port,
        context_path: config.server.context_path.clone(),
    };
    let synthesizer = Arc::new(DocumentationSynthesizer::new(
        store.clone(),
        &config.docs.doc_directory,
        settings,
    )?);

    Ok(AppState {
        store,
        registry,
        synthesizer,
    })
}

/// Create the Axum router with all routes and middleware
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    // Application routes pass through the capture middleware
    let captured_routes = demo::router().layer(middleware::from_fn_with_state(
        app_state.store.clone(),
        capture::capture_exchange,
    ));

    // Operator surface, not captured
    let operator_routes = Router::new()
        .route("/api-docs/logs", get(handlers::logs_api::get_all_logs))
        .route(
            "/api-docs/logs/endpoint",
            get(handlers::logs_api::get_logs_by_endpoint),
        )
        .route(
            "/api-docs/logs/date",
            get(handlers::logs_api::get_logs_by_date),
        )
        .route(
            "/api-docs/logs/clean",
            delete(handlers::logs_api::clean_old_logs),
        )
        .route(
            "/api-docs/generate",
            post(handlers::generate::generate_documentation),
        )
        .with_state(app_state);

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(captured_routes)
        .merge(operator_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if config.server.context_path.is_empty() {
        app
    } else {
        Router::new().nest(&config.server.context_path, app)
    }
}
