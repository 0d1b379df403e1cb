//! Liveness endpoint so a hosting platform can confirm the process is alive.
//!
//! Not part of the bot protocol: a single route, fixed body, no auth.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router() -> Router {
    Router::new()
        .route("/", get(alive))
        .layer(TraceLayer::new_for_http())
}

async fn alive() -> &'static str {
    "Bot is running!"
}

/// Serve the liveness endpoint. Runs until the process exits.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Liveness endpoint listening on port {port}");
    axum::serve(listener, router()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_alive_body() {
        assert_eq!(alive().await, "Bot is running!");
    }
}
