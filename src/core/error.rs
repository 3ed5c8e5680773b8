//! 工作流错误类型
//!
//! 所有阶段、Worker 与注册表的失败都归入 AgentError，沿 `?` 向上传播；
//! 仅在 HTTP / REPL 边界转换为面向用户的文本。

use thiserror::Error;

/// 工作流运行过程中可能出现的错误（配置缺失、路由异常、LLM 调用失败等）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 注册表 / 依赖配置不一致（如角色名与 Worker 类型不匹配）
    #[error("Config error: {0}")]
    ConfigError(String),

    /// 名称从未构建过实例（未注册或未调用 initialize）
    #[error("Worker '{0}' not initialized. Call initialize() first.")]
    WorkerNotFound(String),

    /// 阶段需要的依赖在 Deps 中不存在
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    /// 请求语言与 english 均无拒绝模板
    #[error("No refusal template for language '{0}' and no english fallback")]
    MissingRefusalTemplate(String),

    /// 路由器返回了未知的路由编码
    #[error("Unknown route code: {0}")]
    UnknownRoute(i64),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// 阶段所需的状态字段缺失（如未经 Classify 直接进入 Refuse）
    #[error("Invalid workflow state: {0}")]
    InvalidState(&'static str),
}

impl AgentError {
    /// 是否属于配置类错误（HTTP 边界映射为 4xx）
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AgentError::ConfigError(_)
                | AgentError::WorkerNotFound(_)
                | AgentError::MissingDependency(_)
                | AgentError::MissingRefusalTemplate(_)
        )
    }
}
