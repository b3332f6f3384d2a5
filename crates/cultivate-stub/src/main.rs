//! CultivateCo API stub server: standalone development server.
//!
//! Serves the API under `/api` on `CULTIVATE_STUB_PORT` (default 3001), which
//! matches the client's default base URL. Log in with the seeded demo
//! account to get a session.

use std::net::SocketAddr;
use std::process::ExitCode;

use cultivate_stub::{router, AppState, StubConfig, DEMO_EMAIL};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StubConfig::from_env();
    let state = AppState::with_config(&config);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(
        token_ttl_secs = config.token_ttl.as_secs(),
        demo_account = DEMO_EMAIL,
        "cultivate-stub listening on {addr}"
    );

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("server error: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
