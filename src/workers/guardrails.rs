//! 输出守护：按语言、软字数上限与格式规则重排版回复
//!
//! 约束全部写在 prompt 中，由模型尽力遵守；代码层面不做截断或过滤。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::workers::prompts::guardrails_instructions;
use crate::workers::{Lifecycle, Reformatter};

pub const DEFAULT_SOFT_WORD_LIMIT: usize = 250;

pub struct OutputReformatter {
    llm: Arc<dyn LlmClient>,
    language: String,
    soft_word_limit: usize,
    verbose: bool,
}

impl OutputReformatter {
    pub fn new(llm: Arc<dyn LlmClient>, language: impl Into<String>) -> Self {
        Self {
            llm,
            language: language.into(),
            soft_word_limit: DEFAULT_SOFT_WORD_LIMIT,
            verbose: false,
        }
    }

    pub fn with_soft_word_limit(mut self, limit: usize) -> Self {
        self.soft_word_limit = limit;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Lifecycle for OutputReformatter {}

#[async_trait]
impl Reformatter for OutputReformatter {
    async fn reformat(&self, message: &str) -> Result<String, AgentError> {
        if self.verbose {
            tracing::debug!(input = %message, "formatting");
        }

        let messages = [
            Message::system(guardrails_instructions(&self.language, self.soft_word_limit)),
            Message::user(message),
        ];
        let formatted = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;

        if self.verbose {
            tracing::debug!(output = %formatted, "formatted");
        }
        Ok(formatted)
    }
}
