use anyhow::{Context, Result};
use pdf_utility_server::{app, config::AppConfig, state::AppState};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "pdf_utility_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!(?cfg, "starting pdf-utility-server");

    let state = AppState::new(cfg.artifact_ttl);
    let app = app(state, cfg.max_upload_bytes);

    let listener = bind(&cfg).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind the configured address. A wildcard host that the process may not
/// bind falls back to loopback on the same port.
async fn bind(cfg: &AppConfig) -> Result<TcpListener> {
    let addr = cfg.addr();
    match TcpListener::bind(&addr).await {
        Ok(listener) => Ok(listener),
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(%addr, error = %err, %fallback, "permission denied, binding loopback");
            TcpListener::bind(&fallback)
                .await
                .with_context(|| format!("binding {fallback}"))
        }
        Err(err) => Err(err).with_context(|| format!("binding {addr}")),
    }
}
