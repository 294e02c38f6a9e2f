use anyhow::Context;
use chat_relay::server::build_router;
use chat_relay::util::{env_bind_addr, init_tracing, AppState};
use chat_relay::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Refuse to start without a credential rather than failing on the first chat.
    let config = RelayConfig::from_env().context("failed to load relay configuration")?;
    tracing::info!(
        model = %config.model,
        api_url = %config.api_url,
        timeout_secs = config.timeout.as_secs(),
        "relay configured"
    );

    let state = AppState::new(config);
    if !state.static_dir.join("index.html").is_file() {
        tracing::warn!(
            static_dir = %state.static_dir.display(),
            "index.html not found; GET / will return 404"
        );
    }
    let app = build_router(state);

    let addr = env_bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address: {addr}"))?;
    tracing::info!(
        "listening on {}",
        listener
            .local_addr()
            .context("failed to get local address")?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
