//! assistkit 交互式命令行
//!
//! 入口：加载配置、初始化日志、按配置选择 LLM，然后逐行读取用户输入并跑工作流。
//! 成功的轮次写入短期对话历史，下一轮作为上下文传给生成器。
//!
//! 用法：assistkit [config.toml]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use assistkit::agent::{AgentService, ChatRequestOptions};
use assistkit::config::load_config;
use assistkit::memory::ConversationMemory;
use assistkit::workflow::{generic_error_message, ChatOutcome};

const HELP: &str = "Commands: /clear (forget history), /history, /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load configuration")?;
    assistkit::observability::init(cfg.app.debug_mode);

    let language = cfg.app.default_language.clone();
    let use_mcp = cfg.mcp.enabled;
    let mut history = ConversationMemory::new(cfg.workflow.max_history_turns);
    let service = AgentService::from_config(cfg);

    println!("{}", service.config().app.name.as_deref().unwrap_or("assistkit"));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read input from stdin")? else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{HELP}");
                continue;
            }
            "/clear" => {
                history.clear();
                println!("History cleared.");
                continue;
            }
            "/history" => {
                for msg in history.messages() {
                    println!("[{:?}] {}", msg.role, msg.content);
                }
                continue;
            }
            _ => {}
        }

        let opts = ChatRequestOptions {
            use_mcp,
            language: Some(language.clone()),
            history: history.messages().to_vec(),
            ..ChatRequestOptions::default()
        };
        match service.process_message(input, opts).await {
            ChatOutcome::Response(reply) => {
                println!("{reply}");
                history.push_turn(input, reply);
            }
            ChatOutcome::TimedOut => println!("Request timeout. Please try again."),
            ChatOutcome::Failed(e) => {
                tracing::debug!(error = %e, "turn failed");
                println!("{}", generic_error_message(&language));
            }
        }
    }

    Ok(())
}
