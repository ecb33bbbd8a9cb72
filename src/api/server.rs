//! HTTP server implementation

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::RagService;
use crate::Result;

/// Assemble the full application: `/` banner, `/api` routes and middleware
pub fn build_router(state: AppState, enable_cors: bool, max_upload_bytes: usize) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::root))
        .nest("/api", routes::api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        );

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting PDF RAG API server...");

    let service = Arc::new(RagService::new(config)?);
    let app = build_router(
        AppState::new(service),
        enable_cors,
        config.server.max_upload_bytes,
    );

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /                - Banner");
    info!("  GET    /api/health      - Health check");
    info!("  POST   /api/upload      - Upload a PDF (multipart field `file`)");
    info!("  POST   /api/chat        - Ask a question");
    info!("  GET    /api/documents   - Index statistics and models");
    info!("  DELETE /api/documents   - Clear the index");

    axum::serve(listener, app).await?;

    Ok(())
}
