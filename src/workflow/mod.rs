//! 对话工作流：状态、依赖包、按语言的文案与阶段引擎

pub mod deps;
pub mod engine;
pub mod messages;
pub mod state;

pub use deps::{roles, Deps};
pub use engine::{run_from, run_with_timeout, run_workflow, step, ChatOutcome, Stage};
pub use messages::{generic_error_message, RefusalTemplates, FALLBACK_LANGUAGE, REFUSAL_PLACEHOLDER};
pub use state::{RefusalInfo, TaskType, WorkflowState};
