//! Worker 契约
//!
//! 每个 Worker 完成一次基于 LLM 的操作（分类 / 生成 / 翻译 / 重排版）。
//! 所有 Worker 都实现 Lifecycle：注册表在构建实例后统一 await 其 initialize，
//! 默认实现为空操作，需要异步准备（如校验 MCP 地址）的 Worker 自行覆盖。

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::memory::Message;

/// 可选的异步初始化能力
#[async_trait]
pub trait Lifecycle: Send + Sync {
    async fn initialize(&self) -> Result<(), AgentError> {
        Ok(())
    }
}

/// 路由编码（序数编码，与路由器原始输出一一对应）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Conversation,
    Refuse,
    Translate,
}

impl Route {
    pub fn code(self) -> i64 {
        match self {
            Route::Conversation => 1,
            Route::Refuse => 2,
            Route::Translate => 3,
        }
    }
}

/// 编码不在 {1, 2, 3} 内一律视为错误，不做猜测
impl TryFrom<i64> for Route {
    type Error = AgentError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Route::Conversation),
            2 => Ok(Route::Refuse),
            3 => Ok(Route::Translate),
            other => Err(AgentError::UnknownRoute(other)),
        }
    }
}

/// 路由器输出：原始路由编码 + 一句话理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingResult {
    pub route: i64,
    pub reasoning: String,
}

impl RoutingResult {
    pub fn new(route: Route, reasoning: impl Into<String>) -> Self {
        Self {
            route: route.code(),
            reasoning: reasoning.into(),
        }
    }

    /// 解码路由编码；未知编码返回 UnknownRoute
    pub fn decode(&self) -> Result<Route, AgentError> {
        Route::try_from(self.route)
    }
}

/// 路由器：对用户消息分类
#[async_trait]
pub trait Router: Lifecycle {
    async fn classify(&self, message: &str) -> Result<RoutingResult, AgentError>;
}

/// 生成器：结合历史对话生成回复
#[async_trait]
pub trait Generator: Lifecycle {
    async fn respond(&self, message: &str, history: &[Message]) -> Result<String, AgentError>;
}

/// 翻译器：把消息翻译为目标语言
#[async_trait]
pub trait Translator: Lifecycle {
    async fn translate(&self, message: &str, target_language: &str) -> Result<String, AgentError>;
}

/// 重排版器（守护）：软字数上限与格式规则仅通过 prompt 约束，不保证截断
#[async_trait]
pub trait Reformatter: Lifecycle {
    async fn reformat(&self, message: &str) -> Result<String, AgentError>;
}

/// 注册表中保存的 Worker 句柄（按能力区分）
#[derive(Clone)]
pub enum Worker {
    Router(Arc<dyn Router>),
    Generator(Arc<dyn Generator>),
    Translator(Arc<dyn Translator>),
    Reformatter(Arc<dyn Reformatter>),
}

impl Worker {
    pub fn router(worker: impl Router + 'static) -> Self {
        Worker::Router(Arc::new(worker))
    }

    pub fn generator(worker: impl Generator + 'static) -> Self {
        Worker::Generator(Arc::new(worker))
    }

    pub fn translator(worker: impl Translator + 'static) -> Self {
        Worker::Translator(Arc::new(worker))
    }

    pub fn reformatter(worker: impl Reformatter + 'static) -> Self {
        Worker::Reformatter(Arc::new(worker))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Worker::Router(_) => "router",
            Worker::Generator(_) => "generator",
            Worker::Translator(_) => "translator",
            Worker::Reformatter(_) => "reformatter",
        }
    }

    pub async fn initialize(&self) -> Result<(), AgentError> {
        match self {
            Worker::Router(w) => w.initialize().await,
            Worker::Generator(w) => w.initialize().await,
            Worker::Translator(w) => w.initialize().await,
            Worker::Reformatter(w) => w.initialize().await,
        }
    }

    /// 两个句柄是否指向同一实例
    pub fn ptr_eq(&self, other: &Worker) -> bool {
        match (self, other) {
            (Worker::Router(a), Worker::Router(b)) => Arc::ptr_eq(a, b),
            (Worker::Generator(a), Worker::Generator(b)) => Arc::ptr_eq(a, b),
            (Worker::Translator(a), Worker::Translator(b)) => Arc::ptr_eq(a, b),
            (Worker::Reformatter(a), Worker::Reformatter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Worker").field(&self.kind()).finish()
    }
}
