//! Worker 层：契约、基于 LLM 的实现、提示词与注册表

pub mod factory;
pub mod generator;
pub mod guardrails;
pub mod prompts;
pub mod registry;
pub mod router;
pub mod traits;
pub mod translator;

pub use factory::{create_registry, RegistryOptions};
pub use generator::ReasoningAgent;
pub use guardrails::{OutputReformatter, DEFAULT_SOFT_WORD_LIMIT};
pub use registry::{WorkerConfig, WorkerFactory, WorkerRegistry};
pub use router::{parse_routing_output, LlmRouter};
pub use traits::{Generator, Lifecycle, Reformatter, Route, Router, RoutingResult, Translator, Worker};
pub use translator::SimpleTranslator;
