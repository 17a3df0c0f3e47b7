//! # HTTP Server for Bill-Payment Codes
//!
//! Exposes the generator over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! thaibill serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/api/health` | `{"status": "ok", "bootTime": ...}` |
//! | POST | `/api/parse` | parsed record and both payloads as JSON |
//! | POST | `/api/generate` | like `/api/parse`, plus both images as data URLs |
//! | GET | `/api/qr.png?barcode=...` | QR code PNG |
//! | GET | `/api/barcode.png?barcode=...` | Code 128 PNG |
//!
//! POST bodies are `{"barcode": "...", "lenient": false}`. Codec errors are
//! answered with 400, everything else with 500.

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::ThaiBillError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::bill::health))
        .route("/api/parse", post(handlers::bill::parse))
        .route("/api/generate", post(handlers::bill::generate))
        .route("/api/qr.png", get(handlers::bill::qr_png))
        .route("/api/barcode.png", get(handlers::bill::barcode_png))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use thaibill::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), thaibill::ThaiBillError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), ThaiBillError> {
    let listen_addr = config.listen_addr.clone();
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| ThaiBillError::Server(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    tracing::info!(addr = %listen_addr, "thaibill HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| ThaiBillError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
