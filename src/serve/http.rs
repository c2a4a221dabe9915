//! Static file router with cross-origin isolation headers.

use std::io;
use std::path::Path;

use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

/// Required for `SharedArrayBuffer` in Emscripten pthread builds.
pub const COOP_HEADER: &str = "cross-origin-opener-policy";
pub const COOP_VALUE: &str = "same-origin";
pub const COEP_HEADER: &str = "cross-origin-embedder-policy";
pub const COEP_VALUE: &str = "require-corp";

/// Serve `web_dir`, adding the isolation headers to every response.
pub fn router(web_dir: &Path) -> Router {
    let opener_policy = SetResponseHeaderLayer::overriding(
        HeaderName::from_static(COOP_HEADER),
        HeaderValue::from_static(COOP_VALUE),
    );
    let embedder_policy = SetResponseHeaderLayer::overriding(
        HeaderName::from_static(COEP_HEADER),
        HeaderValue::from_static(COEP_VALUE),
    );

    Router::new()
        .fallback_service(ServeDir::new(web_dir).append_index_html_on_directories(true))
        .layer(opener_policy)
        .layer(embedder_policy)
}

/// Serve until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::debug!("Interrupt received, shutting down");
}
