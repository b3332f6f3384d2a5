//! # cultivate-stub: In-memory CultivateCo API stub
//!
//! Implements the auth and dashboard endpoints that `cultivate-client`
//! calls, backed by DashMaps seeded with sample facilities, alerts, and
//! inventory. Access tokens expire after a configurable TTL so the client's
//! refresh path can be exercised end to end.
//!
//! Storage is in-memory with no persistence: data is lost on restart.

pub mod error;
pub mod extractors;
pub mod routes;
pub mod store;

pub use routes::router;
pub use store::{AppState, StubConfig, DEMO_EMAIL, DEMO_PASSWORD};

use std::net::SocketAddr;

/// Bind `addr` and serve the stub in a background task.
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
pub async fn spawn(addr: SocketAddr, state: AppState) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            tracing::error!("stub server stopped: {e}");
        }
    });
    Ok(bound)
}
