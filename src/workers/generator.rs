//! 通用助手（生成器）
//!
//! system 指令 + 历史对话 + 当前消息 → LLM 回复。
//! 挂载工具时，LLM 可先回复工具调用 JSON，结果作为新一轮输入返回，直到给出普通回复。
//! 可挂载 MCP 服务器地址：initialize 时仅保留 http/https 地址，其余记录告警后丢弃。

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::tools::{parse_tool_call, ToolRegistry};
use crate::workers::prompts::{agent_instructions, tool_instructions};
use crate::workers::{Generator, Lifecycle};

pub struct ReasoningAgent {
    llm: Arc<dyn LlmClient>,
    language: String,
    verbose: bool,
    mcp_urls: Vec<String>,
    active_mcp_urls: OnceLock<Vec<String>>,
    tools: Arc<ToolRegistry>,
    max_tool_rounds: usize,
}

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;

impl ReasoningAgent {
    pub fn new(llm: Arc<dyn LlmClient>, language: impl Into<String>) -> Self {
        Self {
            llm,
            language: language.into(),
            verbose: false,
            mcp_urls: Vec::new(),
            active_mcp_urls: OnceLock::new(),
            tools: Arc::new(ToolRegistry::new()),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    /// 单次回复内最多执行的工具调用次数
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_mcp_urls(mut self, urls: Vec<String>) -> Self {
        self.mcp_urls = urls;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// initialize 之后通过校验的 MCP 地址；未初始化时为空
    pub fn active_mcp_urls(&self) -> &[String] {
        self.active_mcp_urls.get().map(Vec::as_slice).unwrap_or(&[])
    }

    fn build_messages(&self, message: &str, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        let mut system = agent_instructions(&self.language);
        if !self.tools.is_empty() {
            system.push_str("\n\n");
            system.push_str(&tool_instructions(&self.tools.to_schema_json()));
        }
        messages.push(Message::system(system));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(message));
        messages
    }
}

#[async_trait]
impl Lifecycle for ReasoningAgent {
    async fn initialize(&self) -> Result<(), AgentError> {
        let accepted: Vec<String> = self
            .mcp_urls
            .iter()
            .filter(|url| {
                let ok = url.starts_with("http://") || url.starts_with("https://");
                if !ok {
                    tracing::warn!(url = %url, "Invalid MCP URL format, skipping");
                }
                ok
            })
            .cloned()
            .collect();

        if !accepted.is_empty() {
            tracing::info!(count = accepted.len(), "MCP servers enabled for agent");
        }
        let _ = self.active_mcp_urls.set(accepted);
        Ok(())
    }
}

#[async_trait]
impl Generator for ReasoningAgent {
    async fn respond(&self, message: &str, history: &[Message]) -> Result<String, AgentError> {
        let mut messages = self.build_messages(message, history);
        let mut rounds = 0;

        loop {
            let output = self
                .llm
                .complete(&messages)
                .await
                .map_err(AgentError::LlmError)?;

            if self.verbose {
                let (prompt, completion, total) = self.llm.token_usage();
                tracing::debug!(prompt, completion, total, "agent token usage");
            }

            let call = if self.tools.is_empty() {
                None
            } else {
                parse_tool_call(&output)
            };
            let Some(call) = call else {
                return Ok(output);
            };

            if rounds >= self.max_tool_rounds {
                return Err(AgentError::LlmError(format!(
                    "agent exceeded {} tool calls",
                    self.max_tool_rounds
                )));
            }
            rounds += 1;

            let observation = match self.tools.execute(&call.tool, call.args).await {
                Ok(result) => result,
                Err(e) => format!("Error: {e}"),
            };
            tracing::info!(tool = %call.tool, round = rounds, "agent tool call");

            messages.push(Message::assistant(output));
            messages.push(Message::user(format!(
                "Tool `{}` returned: {observation}",
                call.tool
            )));
        }
    }
}
