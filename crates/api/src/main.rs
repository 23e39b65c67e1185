use anyhow::Context;
use tokio_util::sync::CancellationToken;

use shelfkeeper_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    shelfkeeper_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let shutdown = CancellationToken::new();
    let app = shelfkeeper_api::app::build_app(&config, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            shutdown.cancel();
        })
        .await
        .context("server error")?;

    Ok(())
}
