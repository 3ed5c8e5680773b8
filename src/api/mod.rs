//! HTTP 边界（feature `web`）：POST /api/chat 与 GET /api/health

pub mod chat;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::agent::AgentService;

pub use chat::{ChatRequest, ChatResponse};

pub fn router(service: Arc<AgentService>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::api_chat))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(service)
}
