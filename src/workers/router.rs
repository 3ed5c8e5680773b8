//! LLM 路由器
//!
//! 以 ROUTER_INSTRUCTIONS 为 system 指令调用 LLM，解析 `{"route": n, "reasoning": "..."}`。
//! 这里只负责把文本解析成 RoutingResult，编码是否合法由工作流的分类阶段判定。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::workers::prompts::ROUTER_INSTRUCTIONS;
use crate::workers::{Lifecycle, Router, RoutingResult};

#[derive(Debug, Deserialize)]
struct RawRouting {
    route: i64,
    #[serde(default)]
    reasoning: String,
}

/// 从 LLM 输出中提取 JSON（```json ... ``` 或首尾花括号之间）并解析
pub fn parse_routing_output(output: &str) -> Result<RoutingResult, AgentError> {
    let trimmed = output.trim();
    let braces = trimmed
        .find('{')
        .zip(trimmed.rfind('}'))
        .filter(|(start, end)| start < end);

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim())
    } else if let Some((start, end)) = braces {
        &trimmed[start..=end]
    } else {
        return Err(AgentError::JsonParseError(format!(
            "router output has no JSON object: {trimmed}"
        )));
    };

    let raw: RawRouting = serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParseError(format!("{}: {}", e, json_str)))?;

    Ok(RoutingResult {
        route: raw.route,
        reasoning: raw.reasoning,
    })
}

pub struct LlmRouter {
    llm: Arc<dyn LlmClient>,
    instructions: String,
    verbose: bool,
}

impl LlmRouter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            instructions: ROUTER_INSTRUCTIONS.to_string(),
            verbose: false,
        }
    }

    /// 自定义路由指令（需仍要求输出同样的 JSON 格式）
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Lifecycle for LlmRouter {}

#[async_trait]
impl Router for LlmRouter {
    async fn classify(&self, message: &str) -> Result<RoutingResult, AgentError> {
        let messages = [Message::system(self.instructions.clone()), Message::user(message)];
        let output = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        let routing = parse_routing_output(&output)?;

        if self.verbose {
            tracing::debug!(route = routing.route, reasoning = %routing.reasoning, "router decision");
        }
        Ok(routing)
    }
}
