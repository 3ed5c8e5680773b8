//! Worker 注册表
//!
//! 名称 → Worker 实例的映射，支持两种注册方式：
//! - `register`：登记工厂与配置，`initialize` 时按登记顺序惰性构建并 await 各自的 Lifecycle::initialize
//! - `register_instance`：直接登记已构建实例
//!
//! 重复登记同名工厂会覆盖旧工厂（保留原顺序）；同名实例一旦存在，始终优先于工厂，直到 `clear`。
//! 多个请求共享同一注册表并发调用 `initialize` 时，构建过程串行化，同一名称只构建一次。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::core::AgentError;
use crate::workers::Worker;
use crate::workflow::{roles, Deps};

/// 构建 Worker 时传入的配置（原先的关键字参数）
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    pub language: Option<String>,
    pub verbose: bool,
    pub soft_word_limit: Option<usize>,
    pub target_language: Option<String>,
    pub mcp_urls: Vec<String>,
}

impl WorkerConfig {
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("english")
    }
}

pub type WorkerFactory = Arc<dyn Fn(&WorkerConfig) -> Result<Worker, AgentError> + Send + Sync>;

struct FactoryEntry {
    name: String,
    factory: WorkerFactory,
    config: WorkerConfig,
}

#[derive(Default)]
pub struct WorkerRegistry {
    factories: Vec<FactoryEntry>,
    instances: RwLock<HashMap<String, Worker>>,
    init_lock: Mutex<()>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记惰性工厂；同名工厂覆盖
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F, config: WorkerConfig) -> &mut Self
    where
        F: Fn(&WorkerConfig) -> Result<Worker, AgentError> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: WorkerFactory = Arc::new(factory);
        match self.factories.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                tracing::debug!(worker = %name, "overwriting worker factory");
                entry.factory = factory;
                entry.config = config;
            }
            None => self.factories.push(FactoryEntry {
                name,
                factory,
                config,
            }),
        }
        self
    }

    /// 登记已构建实例，跳过惰性构建；同名实例覆盖
    pub fn register_instance(&mut self, name: impl Into<String>, worker: Worker) -> &mut Self {
        self.instances.get_mut().insert(name.into(), worker);
        self
    }

    /// 构建所有尚无实例的工厂条目（按登记顺序），并 await 各自的初始化钩子
    pub async fn initialize(&self) -> Result<(), AgentError> {
        let _guard = self.init_lock.lock().await;

        for entry in &self.factories {
            if self.instances.read().await.contains_key(&entry.name) {
                continue;
            }
            let worker = (entry.factory)(&entry.config)?;
            worker.initialize().await?;
            tracing::debug!(worker = %entry.name, kind = worker.kind(), "worker ready");
            self.instances.write().await.insert(entry.name.clone(), worker);
        }
        Ok(())
    }

    /// 获取已构建实例；未构建（未注册或未 initialize）返回 WorkerNotFound
    pub async fn get(&self, name: &str) -> Result<Worker, AgentError> {
        self.instances
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::WorkerNotFound(name.to_string()))
    }

    /// 名称是否已登记（工厂或实例，不论是否已构建）
    pub async fn has(&self, name: &str) -> bool {
        self.factories.iter().any(|e| e.name == name) || self.instances.read().await.contains_key(name)
    }

    /// 所有已登记名称（去重，按名称排序）
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.name.clone()).collect();
        names.extend(self.instances.read().await.keys().cloned());
        names.sort();
        names.dedup();
        names
    }

    /// 把已构建实例放入 Deps 的角色槽位；非角色名称进入 `workers`。
    /// 调用方随后用 `with_*` 追加的值会覆盖这里的同名项。
    pub async fn to_deps(&self) -> Result<Deps, AgentError> {
        let mut deps = Deps::default();
        for (name, worker) in self.instances.read().await.iter() {
            match (name.as_str(), worker.clone()) {
                (roles::ROUTER, Worker::Router(w)) => deps.router = Some(w),
                (roles::AGENT, Worker::Generator(w)) => deps.agent = Some(w),
                (roles::GUARDRAILS, Worker::Reformatter(w)) => deps.guardrails = Some(w),
                (roles::TRANSLATOR, Worker::Translator(w)) => deps.translator = Some(w),
                (role @ (roles::ROUTER | roles::AGENT | roles::GUARDRAILS | roles::TRANSLATOR), other) => {
                    return Err(AgentError::ConfigError(format!(
                        "worker '{role}' has unexpected kind '{}'",
                        other.kind()
                    )));
                }
                (_, other) => {
                    deps.workers.insert(name.clone(), other);
                }
            }
        }
        Ok(deps)
    }

    /// 清空全部实例与工厂
    pub fn clear(&mut self) {
        self.factories.clear();
        self.instances.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::workers::{Lifecycle, Reformatter, Route, Router, RoutingResult};

    struct FixedRouter {
        init_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Lifecycle for FixedRouter {
        async fn initialize(&self) -> Result<(), AgentError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl Router for FixedRouter {
        async fn classify(&self, _message: &str) -> Result<RoutingResult, AgentError> {
            Ok(RoutingResult::new(Route::Conversation, "fixed"))
        }
    }

    struct Identity;

    impl Lifecycle for Identity {}

    #[async_trait]
    impl Reformatter for Identity {
        async fn reformat(&self, message: &str) -> Result<String, AgentError> {
            Ok(message.to_string())
        }
    }

    fn counting_router_factory(
        built: Arc<AtomicUsize>,
        init_calls: Arc<AtomicUsize>,
    ) -> impl Fn(&WorkerConfig) -> Result<Worker, AgentError> + Send + Sync + 'static {
        move |_cfg| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(Worker::router(FixedRouter {
                init_calls: init_calls.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let built = Arc::new(AtomicUsize::new(0));
        let init_calls = Arc::new(AtomicUsize::new(0));
        let mut registry = WorkerRegistry::new();
        registry.register(
            "router",
            counting_router_factory(built.clone(), init_calls.clone()),
            WorkerConfig::default(),
        );

        registry.initialize().await.unwrap();
        let first = registry.get("router").await.unwrap();
        registry.initialize().await.unwrap();
        let second = registry.get("router").await.unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
        assert!(first.ptr_eq(&second));
    }

    #[tokio::test]
    async fn test_concurrent_initialize_builds_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let init_calls = Arc::new(AtomicUsize::new(0));
        let mut registry = WorkerRegistry::new();
        registry.register(
            "router",
            counting_router_factory(built.clone(), init_calls.clone()),
            WorkerConfig::default(),
        );
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&registry);
                tokio::spawn(async move { r.initialize().await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_and_has_on_unregistered_name() {
        let registry = WorkerRegistry::new();
        assert!(!registry.has("router").await);
        assert!(matches!(
            registry.get("router").await,
            Err(AgentError::WorkerNotFound(name)) if name == "router"
        ));
    }

    #[tokio::test]
    async fn test_lazy_registration_visible_before_initialize() {
        let mut registry = WorkerRegistry::new();
        registry.register(
            "router",
            counting_router_factory(Arc::default(), Arc::default()),
            WorkerConfig::default(),
        );

        assert!(registry.has("router").await);
        assert!(matches!(
            registry.get("router").await,
            Err(AgentError::WorkerNotFound(_))
        ));

        registry.initialize().await.unwrap();
        assert!(registry.get("router").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_instance_bypasses_factory() {
        let instance = Worker::router(FixedRouter {
            init_calls: Arc::default(),
        });
        let built = Arc::new(AtomicUsize::new(0));

        // 先实例后工厂
        let mut registry = WorkerRegistry::new();
        registry
            .register_instance("router", instance.clone())
            .register(
                "router",
                counting_router_factory(built.clone(), Arc::default()),
                WorkerConfig::default(),
            );
        registry.initialize().await.unwrap();
        assert!(registry.get("router").await.unwrap().ptr_eq(&instance));
        assert_eq!(built.load(Ordering::SeqCst), 0);

        // 先工厂后实例
        let mut registry = WorkerRegistry::new();
        registry
            .register(
                "router",
                counting_router_factory(built.clone(), Arc::default()),
                WorkerConfig::default(),
            )
            .register_instance("router", instance.clone());
        registry.initialize().await.unwrap();
        assert!(registry.get("router").await.unwrap().ptr_eq(&instance));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reregistering_factory_overwrites() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = WorkerRegistry::new();
        registry
            .register(
                "router",
                counting_router_factory(first.clone(), Arc::default()),
                WorkerConfig::default(),
            )
            .register(
                "router",
                counting_router_factory(second.clone(), Arc::default()),
                WorkerConfig::default(),
            );
        registry.initialize().await.unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.names().await, vec!["router".to_string()]);
    }

    #[tokio::test]
    async fn test_factory_receives_its_config() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen_in_factory = seen.clone();
        let mut registry = WorkerRegistry::new();
        registry.register(
            "guardrails",
            move |cfg: &WorkerConfig| {
                *seen_in_factory.lock().unwrap() = cfg.soft_word_limit;
                Ok(Worker::reformatter(Identity))
            },
            WorkerConfig {
                soft_word_limit: Some(42),
                ..WorkerConfig::default()
            },
        );
        registry.initialize().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_to_deps_places_roles_and_rejects_mismatch() {
        let mut registry = WorkerRegistry::new();
        registry
            .register_instance("guardrails", Worker::reformatter(Identity))
            .register_instance("polisher", Worker::reformatter(Identity));
        let deps = registry.to_deps().await.unwrap();
        assert!(deps.guardrails.is_some());
        assert!(deps.router.is_none());
        assert!(deps.workers.contains_key("polisher"));

        registry.register_instance("router", Worker::reformatter(Identity));
        let err = registry.to_deps().await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_clear_resets_registry() {
        let mut registry = WorkerRegistry::new();
        registry
            .register_instance("guardrails", Worker::reformatter(Identity))
            .register(
                "router",
                counting_router_factory(Arc::default(), Arc::default()),
                WorkerConfig::default(),
            );
        registry.clear();
        assert!(!registry.has("guardrails").await);
        assert!(!registry.has("router").await);
        assert!(registry.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_factory_error_propagates() {
        let mut registry = WorkerRegistry::new();
        registry.register(
            "agent",
            |_cfg: &WorkerConfig| Err(AgentError::ConfigError("missing api key".into())),
            WorkerConfig::default(),
        );
        let err = registry.initialize().await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigError(_)));
        assert!(registry.get("agent").await.is_err());
    }
}
