//! 生成器可调用的本地工具

pub mod dateutils;
pub mod registry;

pub use dateutils::{dateutils_toolpack, Today};
pub use registry::{parse_tool_call, Tool, ToolCall, ToolRegistry};
