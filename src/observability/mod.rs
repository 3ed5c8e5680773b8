//! 可观测性：tracing 日志初始化
//!
//! 默认 info 级别，可通过 RUST_LOG 覆盖；debug_mode 打开时提升本 crate 到 debug。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(debug_mode: bool) {
    let level = if debug_mode { "assistkit=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
