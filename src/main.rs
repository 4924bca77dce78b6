use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use aio_server::core::config::ServerEnv;
use aio_server::core::logging;
use aio_server::server;
use aio_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = ServerEnv::from_env();
    logging::init(&env);
    env.log_warnings();

    let port = env.port;
    let state = AppState::initialize(env)
        .await
        .context("Failed to initialize server state")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        "Listening on {}{}",
        addr,
        if state.env.url_prefix.is_empty() {
            String::new()
        } else {
            format!(" (prefix {})", state.env.url_prefix)
        }
    );

    let app: Router = server::router::router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
