//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ASSISTKIT__*` 覆盖（双下划线表示嵌套，如 `ASSISTKIT__LLM__PROVIDER=openai`）。

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub workflow: WorkflowSection,
    pub mcp: McpSection,
    pub server: ServerSection,
}

/// [app] 段：应用名、默认语言、调试输出
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 默认对话语言（拒绝模板、生成、守护均使用）
    pub default_language: String,
    /// 打开后以 debug 级别记录 Worker 输入输出
    pub debug_mode: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            default_language: "english".to_string(),
            debug_mode: false,
        }
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub deepseek: LlmDeepSeekSection,
    pub openai: LlmOpenAiSection,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

/// [llm.timeouts] 段：单次 LLM 请求超时（秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [workflow] 段：整次运行超时、守护字数、消息长度、历史轮数、拒绝模板覆盖
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    /// 整个工作流的超时（秒），超时返回「请重试」
    pub timeout_secs: u64,
    /// 守护阶段的软字数上限（仅写入 prompt，不做硬截断）
    pub soft_word_limit: usize,
    /// HTTP 入口允许的最大消息字符数
    pub max_message_chars: usize,
    /// REPL 保留的对话轮数
    pub max_history_turns: usize,
    /// 按语言覆盖默认拒绝模板，需包含 `{refusal_reason}` 占位符
    pub refusal_templates: HashMap<String, String>,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            soft_word_limit: 250,
            max_message_chars: 1000,
            max_history_turns: 20,
            refusal_templates: HashMap::new(),
        }
    }
}

/// [mcp] 段：是否默认启用 MCP 以及默认服务器地址
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct McpSection {
    pub enabled: bool,
    pub urls: Vec<String>,
}

/// [server] 段：assistkit-web 监听地址
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 从 config 目录加载配置，环境变量 ASSISTKIT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ASSISTKIT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ASSISTKIT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
