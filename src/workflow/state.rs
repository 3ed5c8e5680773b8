//! 工作流状态：每次运行新建，由各阶段原地修改，End 之后丢弃

use serde::{Deserialize, Serialize};

use crate::workers::Route;

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Conversation,
    Refuse,
    Translate,
}

impl From<Route> for TaskType {
    fn from(route: Route) -> Self {
        match route {
            Route::Conversation => TaskType::Conversation,
            Route::Refuse => TaskType::Refuse,
            Route::Translate => TaskType::Translate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalInfo {
    pub refusal_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub current_message: String,
    /// 分类阶段之前为 None
    pub task_type: Option<TaskType>,
    pub generated_response: String,
    /// 仅当分类为 Refuse 时存在
    pub refusal_info: Option<RefusalInfo>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分类为拒绝：同时记录分类与理由
    pub fn set_refusal(&mut self, reason: impl Into<String>) {
        self.task_type = Some(TaskType::Refuse);
        self.refusal_info = Some(RefusalInfo {
            refusal_reason: reason.into(),
        });
    }

    pub fn set_task_type(&mut self, task_type: TaskType) {
        self.task_type = Some(task_type);
        if task_type != TaskType::Refuse {
            self.refusal_info = None;
        }
    }
}
