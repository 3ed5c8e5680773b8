//! 工作流引擎：显式状态枚举 + 分派循环
//!
//! Start → Classify → {Generate | Translate | Refuse} → Guardrails → End；Refuse 直接到 End。
//! 每个阶段只 await 一次 Worker 调用，错误原样向上传播，引擎内部不重试、不恢复。

use std::time::Duration;

use tokio::time::timeout;

use crate::core::AgentError;
use crate::workflow::{Deps, TaskType, WorkflowState};

/// 工作流阶段；End 携带最终回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Start,
    Classify,
    Generate,
    Translate,
    Guardrails,
    Refuse,
    End(String),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Classify => "classify",
            Stage::Generate => "generate",
            Stage::Translate => "translate",
            Stage::Guardrails => "guardrails",
            Stage::Refuse => "refuse",
            Stage::End(_) => "end",
        }
    }
}

/// 执行单个阶段，返回下一阶段
pub async fn step(stage: Stage, state: &mut WorkflowState, deps: &Deps) -> Result<Stage, AgentError> {
    match stage {
        Stage::Start => {
            state.current_message = deps.message()?.to_string();
            Ok(Stage::Classify)
        }
        Stage::Classify => {
            let routing = deps.router()?.classify(&state.current_message).await?;
            let route = routing.decode()?;
            tracing::info!(route = route.code(), reasoning = %routing.reasoning, "message classified");
            match TaskType::from(route) {
                TaskType::Refuse => {
                    state.set_refusal(routing.reasoning);
                    Ok(Stage::Refuse)
                }
                TaskType::Translate => {
                    state.set_task_type(TaskType::Translate);
                    Ok(Stage::Translate)
                }
                TaskType::Conversation => {
                    state.set_task_type(TaskType::Conversation);
                    Ok(Stage::Generate)
                }
            }
        }
        Stage::Generate => {
            let response = deps
                .agent()?
                .respond(&state.current_message, &deps.chat_history)
                .await?;
            state.generated_response = response;
            Ok(Stage::Guardrails)
        }
        Stage::Translate => {
            let translated = deps
                .translator()?
                .translate(&state.current_message, deps.target_language())
                .await?;
            state.generated_response = translated;
            Ok(Stage::Guardrails)
        }
        Stage::Guardrails => {
            let formatted = deps.guardrails()?.reformat(&state.generated_response).await?;
            Ok(Stage::End(formatted))
        }
        Stage::Refuse => {
            let info = state
                .refusal_info
                .as_ref()
                .ok_or(AgentError::InvalidState("refuse stage reached without refusal_info"))?;
            let text = deps
                .refusal_templates()
                .render(deps.language(), &info.refusal_reason)?;
            Ok(Stage::End(text))
        }
        Stage::End(output) => Ok(Stage::End(output)),
    }
}

/// 从指定阶段运行到 End
pub async fn run_from(start: Stage, state: &mut WorkflowState, deps: &Deps) -> Result<String, AgentError> {
    let mut stage = start;
    loop {
        if let Stage::End(output) = stage {
            return Ok(output);
        }
        let from = stage.name();
        stage = step(stage, state, deps).await?;
        tracing::debug!(from, to = stage.name(), "stage transition");
    }
}

/// 从 Start 运行完整工作流
pub async fn run_workflow(state: &mut WorkflowState, deps: &Deps) -> Result<String, AgentError> {
    run_from(Stage::Start, state, deps).await
}

/// 一次运行的最终结果；超时与失败都不带部分输出
#[derive(Debug)]
pub enum ChatOutcome {
    Response(String),
    TimedOut,
    Failed(AgentError),
}

impl ChatOutcome {
    pub fn response(&self) -> Option<&str> {
        match self {
            ChatOutcome::Response(text) => Some(text),
            _ => None,
        }
    }
}

/// 以全新状态运行工作流，整体受 `limit` 约束；超时会丢弃正在挂起的阶段
pub async fn run_with_timeout(deps: &Deps, limit: Duration) -> ChatOutcome {
    let mut state = WorkflowState::new();
    match timeout(limit, run_workflow(&mut state, deps)).await {
        Ok(Ok(output)) => ChatOutcome::Response(output),
        Ok(Err(e)) => ChatOutcome::Failed(e),
        Err(_) => ChatOutcome::TimedOut,
    }
}
