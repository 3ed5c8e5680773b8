//! Mock LLM 客户端（用于测试与无 API Key 的本地运行）
//!
//! - 默认模式：路由请求（system 指令要求输出 `"route"` JSON）固定返回 conversation，其余回显最后一条 User 消息
//! - 脚本模式：按顺序弹出预置回复，并记录每次收到的消息，便于断言 prompt 内容

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient {
    scripted: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    /// 按顺序返回给定回复；用尽后回退到默认模式
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scripted: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的全部请求（每次调用的完整消息序列）
    pub async fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls.lock().await.push(messages.to_vec());

        if let Some(reply) = self.scripted.lock().await.pop_front() {
            return Ok(reply);
        }

        let is_routing = messages
            .iter()
            .any(|m| m.role == Role::System && m.content.contains("\"route\""));
        if is_routing {
            return Ok(r#"{"route": 1, "reasoning": "Mock router: standard conversation."}"#.to_string());
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Echo from Mock: {}", last_user))
    }
}
