//! assistkit：LLM 聊天助手的 Agent 工作流
//!
//! - **workers**: Worker 契约（路由 / 生成 / 翻译 / 守护）、LLM 实现与注册表
//! - **workflow**: 工作流状态、依赖包与阶段引擎
//! - **agent**: 无界面服务，REPL 与 HTTP 共用
//! - **llm**: LLM 客户端（OpenAI 兼容 / DeepSeek / Mock）
//! - **tools**: 生成器可调用的本地工具（日期工具包）
//! - **memory**: 短期对话历史
//! - **api**: HTTP 边界（feature `web`）

pub mod agent;
#[cfg(feature = "web")]
pub mod api;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod tools;
pub mod workers;
pub mod workflow;
