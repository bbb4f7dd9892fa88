//! Task model.

use super::{merge, Entity, EntityId, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Board column of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Today,
    Upcoming,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Today, TaskStatus::Upcoming, TaskStatus::Completed];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Caller-provided date/time text.
    pub due_date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<String>,
}

impl Patch<Task> for TaskPatch {
    fn apply_to(self, target: &mut Task) {
        merge(&mut target.title, self.title);
        merge(&mut target.description, self.description);
        merge(&mut target.priority, self.priority);
        merge(&mut target.status, self.status);
        merge(&mut target.due_date, self.due_date);
    }
}

impl Entity for Task {
    type Draft = NewTask;

    const STORAGE_KEY: &'static str = "crm-tasks";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewTask) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            due_date: draft.due_date,
            created_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
