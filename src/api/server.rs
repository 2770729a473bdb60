//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::search::SearchService;
use crate::store::ScheduleStore;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    search_service: Arc<SearchService>,
    schedule_store: Arc<dyn ScheduleStore>,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting CampusRAG API server...");

    let state = AppState {
        search_service,
        schedule_store,
    };

    let api_router = routes::api_routes(state);

    let mut app = Router::new().nest("/api", api_router);

    // Add middleware layers
    app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /api/health            - Health check");
    info!("  POST /api/search            - Run a knowledge base search");
    info!("  GET  /api/categories        - List classifier categories");
    info!("  GET  /api/schedule/upcoming - List upcoming schedule events");

    axum::serve(listener, app).await?;

    Ok(())
}
