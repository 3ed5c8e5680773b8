//! assistkit HTTP 服务
//!
//! 启动: cargo run --bin assistkit-web --features web
//! 接口: POST /api/chat, GET /api/health

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use assistkit::agent::AgentService;
use assistkit::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config(None).context("Failed to load configuration")?;
    assistkit::observability::init(cfg.app.debug_mode);

    let port = std::env::var("ASSISTKIT_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, port)
        .parse()
        .with_context(|| format!("invalid server address {}:{}", cfg.server.host, port))?;

    let service = Arc::new(AgentService::from_config(cfg));
    let app = assistkit::api::router(service);

    tracing::info!("assistkit API: http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
