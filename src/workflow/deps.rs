//! 依赖包（Deps）：一次运行所需的 Worker 与上下文值
//!
//! 已知角色与上下文值是具名字段；向前兼容的附加值放在 `extras`，
//! 非角色名称登记的 Worker 放在 `workers`。阶段读取缺失的角色时返回 MissingDependency。

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::AgentError;
use crate::memory::Message;
use crate::workers::{Generator, Reformatter, Router, Translator, Worker};
use crate::workflow::messages::{RefusalTemplates, FALLBACK_LANGUAGE};

/// 注册表中的角色名
pub mod roles {
    pub const ROUTER: &str = "router";
    pub const AGENT: &str = "agent";
    pub const GUARDRAILS: &str = "guardrails";
    pub const TRANSLATOR: &str = "translator";
}

#[derive(Clone, Default)]
pub struct Deps {
    pub router: Option<Arc<dyn Router>>,
    pub agent: Option<Arc<dyn Generator>>,
    pub guardrails: Option<Arc<dyn Reformatter>>,
    pub translator: Option<Arc<dyn Translator>>,
    pub message: Option<String>,
    pub language: Option<String>,
    pub target_language: Option<String>,
    pub chat_history: Vec<Message>,
    pub refusal_templates: Option<Arc<RefusalTemplates>>,
    pub workers: HashMap<String, Worker>,
    pub extras: HashMap<String, Value>,
}

impl std::fmt::Debug for Deps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deps")
            .field("router", &self.router.is_some())
            .field("agent", &self.agent.is_some())
            .field("guardrails", &self.guardrails.is_some())
            .field("translator", &self.translator.is_some())
            .field("message", &self.message)
            .field("language", &self.language)
            .field("target_language", &self.target_language)
            .field("chat_history", &self.chat_history.len())
            .field("workers", &self.workers.keys().collect::<Vec<_>>())
            .field("extras", &self.extras)
            .finish()
    }
}

impl Deps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    pub fn with_chat_history(mut self, history: Vec<Message>) -> Self {
        self.chat_history = history;
        self
    }

    pub fn with_refusal_templates(mut self, templates: Arc<RefusalTemplates>) -> Self {
        self.refusal_templates = Some(templates);
        self
    }

    pub fn with_router(mut self, router: impl Router + 'static) -> Self {
        self.router = Some(Arc::new(router));
        self
    }

    pub fn with_agent(mut self, agent: impl Generator + 'static) -> Self {
        self.agent = Some(Arc::new(agent));
        self
    }

    pub fn with_guardrails(mut self, guardrails: impl Reformatter + 'static) -> Self {
        self.guardrails = Some(Arc::new(guardrails));
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn router(&self) -> Result<&Arc<dyn Router>, AgentError> {
        self.router
            .as_ref()
            .ok_or(AgentError::MissingDependency(roles::ROUTER))
    }

    pub fn agent(&self) -> Result<&Arc<dyn Generator>, AgentError> {
        self.agent
            .as_ref()
            .ok_or(AgentError::MissingDependency(roles::AGENT))
    }

    pub fn guardrails(&self) -> Result<&Arc<dyn Reformatter>, AgentError> {
        self.guardrails
            .as_ref()
            .ok_or(AgentError::MissingDependency(roles::GUARDRAILS))
    }

    pub fn translator(&self) -> Result<&Arc<dyn Translator>, AgentError> {
        self.translator
            .as_ref()
            .ok_or(AgentError::MissingDependency(roles::TRANSLATOR))
    }

    pub fn message(&self) -> Result<&str, AgentError> {
        self.message
            .as_deref()
            .ok_or(AgentError::MissingDependency("message"))
    }

    /// 对话语言，缺省 english
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(FALLBACK_LANGUAGE)
    }

    /// 翻译目标：target_language → language → english
    pub fn target_language(&self) -> &str {
        self.target_language
            .as_deref()
            .or(self.language.as_deref())
            .unwrap_or(FALLBACK_LANGUAGE)
    }

    /// 未显式设置时使用内置默认模板表
    pub fn refusal_templates(&self) -> Arc<RefusalTemplates> {
        self.refusal_templates
            .clone()
            .unwrap_or_else(|| Arc::new(RefusalTemplates::default()))
    }
}
