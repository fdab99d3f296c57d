use anyhow::{Context, Result};
use log::info;

use crate::config::Config;
use crate::routes::{AppState, build_router};

pub async fn serve(config: Config) -> Result<()> {
    config.require_client_secret()?;

    let addr = config.bind_addr.clone();
    let state = AppState::new(config).context("build http client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
