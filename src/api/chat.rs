//! POST /api/chat
//!
//! 校验失败与配置错误返回 400；超时与 Worker 失败仍返回 200，错误放在 `error` 字段。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentService, ChatRequestOptions};
use crate::workflow::ChatOutcome;

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// 缺省取配置 mcp.enabled
    #[serde(default)]
    pub use_mcp: Option<bool>,
    #[serde(default)]
    pub mcp_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
    pub error: Option<String>,
}

impl ChatResponse {
    fn ok(response: String) -> Self {
        Self {
            response,
            error: None,
        }
    }

    fn error(error: impl Into<String>) -> Self {
        Self {
            response: String::new(),
            error: Some(error.into()),
        }
    }
}

type ChatReply = (StatusCode, Json<ChatResponse>);

fn bad_request(error: impl Into<String>) -> ChatReply {
    (StatusCode::BAD_REQUEST, Json(ChatResponse::error(error)))
}

fn validate(req: &ChatRequest, max_chars: usize) -> Result<(), String> {
    let chars = req.message.chars().count();
    if req.message.trim().is_empty() {
        return Err("message is required".to_string());
    }
    if chars > max_chars {
        return Err(format!("message must be at most {max_chars} characters (got {chars})"));
    }
    Ok(())
}

pub async fn api_chat(
    State(service): State<Arc<AgentService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ChatReply {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    if let Err(e) = validate(&req, service.config().workflow.max_message_chars) {
        return bad_request(e);
    }

    let use_mcp = req.use_mcp.unwrap_or(service.config().mcp.enabled);
    let preview: String = req.message.chars().take(50).collect();
    tracing::info!(message = %preview, use_mcp, "received chat request");

    let opts = ChatRequestOptions {
        use_mcp,
        mcp_urls: if use_mcp { req.mcp_urls } else { None },
        ..ChatRequestOptions::default()
    };

    match service.process_message(&req.message, opts).await {
        ChatOutcome::Response(text) => (StatusCode::OK, Json(ChatResponse::ok(text))),
        ChatOutcome::TimedOut => (StatusCode::OK, Json(ChatResponse::error(TIMEOUT_MESSAGE))),
        ChatOutcome::Failed(e) if e.is_config() => bad_request(format!("Configuration error: {e}")),
        ChatOutcome::Failed(e) => (
            StatusCode::OK,
            Json(ChatResponse::error(format!("An error occurred: {e}"))),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::llm::MockLlmClient;
    use crate::workflow::RefusalTemplates;

    fn app(llm: MockLlmClient) -> axum::Router {
        crate::api::router(Arc::new(AgentService::new(AppConfig::default(), Arc::new(llm))))
    }

    async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, ChatResponse) {
        let res = app
            .oneshot(
                Request::post("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_success() {
        let llm = MockLlmClient::scripted([
            r#"{"route": 1, "reasoning": "Greeting."}"#,
            "Hi there",
            "Hi there!",
        ]);
        let (status, body) = post_chat(app(llm), r#"{"message": "Hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ChatResponse::ok("Hi there!".into()));
    }

    #[tokio::test]
    async fn test_empty_and_oversized_messages_rejected() {
        let (status, body) = post_chat(app(MockLlmClient::default()), r#"{"message": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.is_some());

        let long = "a".repeat(1001);
        let (status, _) = post_chat(
            app(MockLlmClient::default()),
            &serde_json::json!({ "message": long }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let (status, body) = post_chat(app(MockLlmClient::default()), r#"{"text": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.response, "");
    }

    #[tokio::test]
    async fn test_worker_failure_is_reported_in_body() {
        let llm = MockLlmClient::scripted([r#"{"route": 7, "reasoning": "?"}"#]);
        let (status, body) = post_chat(app(llm), r#"{"message": "Hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.error.unwrap().starts_with("An error occurred:"));
    }

    #[tokio::test]
    async fn test_unknown_language_refusal_falls_back_to_english() {
        let mut config = AppConfig::default();
        config.app.default_language = "klingon".into();
        let llm = MockLlmClient::scripted([r#"{"route": 2, "reasoning": "no"}"#]);
        let service = AgentService::new(config, Arc::new(llm));
        let (status, body) = post_chat(crate::api::router(Arc::new(service)), r#"{"message": "x"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.response.starts_with("I'm really sorry"));
        assert!(body.response.ends_with("no"));
    }

    #[tokio::test]
    async fn test_missing_refusal_template_is_config_error() {
        let llm = MockLlmClient::scripted([r#"{"route": 2, "reasoning": "no"}"#]);
        let service = AgentService::new(AppConfig::default(), Arc::new(llm))
            .with_refusal_templates(RefusalTemplates::empty());
        let (status, body) = post_chat(crate::api::router(Arc::new(service)), r#"{"message": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.unwrap().starts_with("Configuration error:"));
    }

    #[tokio::test]
    async fn test_health() {
        let res = app(MockLlmClient::default())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }
}
