//! 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};

/// 后端选择结果，便于日志与测试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    OpenAi,
    Mock,
}

/// 有 DeepSeek Key，或配置为 deepseek 且仅有 OpenAI Key 时走 DeepSeek；
/// 有 OpenAI Key 且未指定 deepseek 时走 OpenAI 兼容端点；否则退回 Mock
pub fn select_provider(provider: &str, has_deepseek_key: bool, has_openai_key: bool) -> Provider {
    let provider = provider.to_lowercase();
    if has_deepseek_key || (provider == "deepseek" && has_openai_key) {
        Provider::DeepSeek
    } else if has_openai_key {
        Provider::OpenAi
    } else {
        Provider::Mock
    }
}

pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let timeout = Duration::from_secs(cfg.llm.timeouts.request);
    let provider = select_provider(
        &cfg.llm.provider,
        std::env::var("DEEPSEEK_API_KEY").is_ok(),
        std::env::var("OPENAI_API_KEY").is_ok(),
    );

    match provider {
        Provider::DeepSeek => {
            let model = cfg
                .llm
                .deepseek
                .model
                .clone()
                .unwrap_or_else(|| crate::llm::DEEPSEEK_CHAT.to_string());
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(create_deepseek_client(Some(&model)).with_request_timeout(timeout))
        }
        Provider::OpenAi => {
            let model = cfg
                .llm
                .openai
                .model
                .clone()
                .unwrap_or_else(|| cfg.llm.model.clone());
            tracing::info!("Using OpenAI-compatible LLM ({})", model);
            Arc::new(
                OpenAiClient::new(
                    cfg.llm.base_url.as_deref(),
                    &model,
                    std::env::var("OPENAI_API_KEY").ok().as_deref(),
                )
                .with_request_timeout(timeout),
            )
        }
        Provider::Mock => {
            tracing::warn!("No API key set, using Mock LLM");
            Arc::new(MockLlmClient::default())
        }
    }
}
