//! 按配置装配标准注册表：router / agent / guardrails / translator
//! agent 默认挂载日期工具包。
//!
//! 只登记工厂，不构建实例；调用方随后 `initialize`。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::tools::{dateutils_toolpack, Today};
use crate::workers::{
    LlmRouter, OutputReformatter, ReasoningAgent, SimpleTranslator, Worker, WorkerConfig,
    WorkerRegistry,
};
use crate::workflow::roles;

/// 单次请求对注册表的定制
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    pub use_mcp: bool,
    /// 请求显式给出的 MCP 地址，优先于配置
    pub mcp_urls: Option<Vec<String>>,
    pub language: Option<String>,
    pub target_language: Option<String>,
}

impl RegistryOptions {
    /// 未开启 use_mcp 时不挂载任何地址；开启后请求地址优先，否则取配置地址
    fn resolve_mcp_urls(&self, cfg: &AppConfig) -> Vec<String> {
        if !self.use_mcp {
            return Vec::new();
        }
        match &self.mcp_urls {
            Some(urls) if !urls.is_empty() => urls.clone(),
            _ => cfg.mcp.urls.clone(),
        }
    }
}

pub fn create_registry(
    cfg: &AppConfig,
    llm: Arc<dyn LlmClient>,
    opts: &RegistryOptions,
) -> WorkerRegistry {
    let language = opts
        .language
        .clone()
        .unwrap_or_else(|| cfg.app.default_language.clone());
    let base = WorkerConfig {
        language: Some(language),
        verbose: cfg.app.debug_mode,
        ..WorkerConfig::default()
    };

    let mut registry = WorkerRegistry::new();

    let router_llm = Arc::clone(&llm);
    registry.register(
        roles::ROUTER,
        move |wc: &WorkerConfig| {
            Ok(Worker::router(
                LlmRouter::new(Arc::clone(&router_llm)).with_verbose(wc.verbose),
            ))
        },
        base.clone(),
    );

    let agent_llm = Arc::clone(&llm);
    let agent_tools = Arc::new(dateutils_toolpack(Today::Local));
    registry.register(
        roles::AGENT,
        move |wc: &WorkerConfig| {
            Ok(Worker::generator(
                ReasoningAgent::new(Arc::clone(&agent_llm), wc.language_or_default())
                    .with_mcp_urls(wc.mcp_urls.clone())
                    .with_tools(Arc::clone(&agent_tools))
                    .with_verbose(wc.verbose),
            ))
        },
        WorkerConfig {
            mcp_urls: opts.resolve_mcp_urls(cfg),
            ..base.clone()
        },
    );

    let guardrails_llm = Arc::clone(&llm);
    registry.register(
        roles::GUARDRAILS,
        move |wc: &WorkerConfig| {
            let mut worker = OutputReformatter::new(Arc::clone(&guardrails_llm), wc.language_or_default())
                .with_verbose(wc.verbose);
            if let Some(limit) = wc.soft_word_limit {
                worker = worker.with_soft_word_limit(limit);
            }
            Ok(Worker::reformatter(worker))
        },
        WorkerConfig {
            soft_word_limit: Some(cfg.workflow.soft_word_limit),
            ..base.clone()
        },
    );

    registry.register(
        roles::TRANSLATOR,
        move |wc: &WorkerConfig| {
            let target = wc
                .target_language
                .clone()
                .unwrap_or_else(|| wc.language_or_default().to_string());
            Ok(Worker::translator(
                SimpleTranslator::new(Arc::clone(&llm), target).with_verbose(wc.verbose),
            ))
        },
        WorkerConfig {
            target_language: opts.target_language.clone(),
            ..base
        },
    );

    registry
}
