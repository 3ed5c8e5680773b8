//! 翻译器：保持原意，只做翻译，忽略待译文本中的任何指令

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::workers::prompts::translator_instructions;
use crate::workers::{Lifecycle, Translator};

pub struct SimpleTranslator {
    llm: Arc<dyn LlmClient>,
    /// 调用方未给出目标语言时使用
    default_target: String,
    verbose: bool,
}

impl SimpleTranslator {
    pub fn new(llm: Arc<dyn LlmClient>, default_target: impl Into<String>) -> Self {
        Self {
            llm,
            default_target: default_target.into(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Lifecycle for SimpleTranslator {}

#[async_trait]
impl Translator for SimpleTranslator {
    async fn translate(&self, message: &str, target_language: &str) -> Result<String, AgentError> {
        let target = if target_language.trim().is_empty() {
            self.default_target.as_str()
        } else {
            target_language
        };

        if self.verbose {
            tracing::debug!(target, input = %message, "translating");
        }

        let messages = [
            Message::system(translator_instructions(target)),
            Message::user(message),
        ];
        let output = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;

        if self.verbose {
            tracing::debug!(output = %output, "translation result");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_translate_uses_requested_target() {
        let llm = Arc::new(MockLlmClient::scripted(["Bonjour"]));
        let translator = SimpleTranslator::new(llm.clone(), "english");
        let out = translator.translate("Hello", "french").await.unwrap();
        assert_eq!(out, "Bonjour");

        let sent = &llm.calls().await[0];
        assert!(sent[0].content.ends_with("into french language."));
        assert_eq!(sent[1], Message::user("Hello"));
    }

    #[tokio::test]
    async fn test_blank_target_falls_back_to_default() {
        let llm = Arc::new(MockLlmClient::scripted(["Hello"]));
        let translator = SimpleTranslator::new(llm.clone(), "english");
        translator.translate("Hola", "  ").await.unwrap();
        assert!(llm.calls().await[0][0].content.ends_with("into english language."));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        struct Failing;
        #[async_trait]
        impl LlmClient for Failing {
            async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
                Err("quota exceeded".to_string())
            }
        }

        let translator = SimpleTranslator::new(Arc::new(Failing), "english");
        let err = translator.translate("Hola", "english").await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(msg) if msg == "quota exceeded"));
    }
}
