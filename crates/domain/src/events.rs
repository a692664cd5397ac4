use crate::room::RoomId;
use crate::todo::Todo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ToDo 変更通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoAction {
    Created,
    Updated,
    Deleted,
}

impl TodoAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoAction::Created => "created",
            TodoAction::Updated => "updated",
            TodoAction::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TodoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const LIST_UPDATED_ACTION: &str = "list-updated";

/// `todo-updates-{roomId}` に配信するメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoChangedMessage {
    pub action: TodoAction,
    pub todo: Todo,
    /// ToDo の updatedAt（Unix 秒の10進文字列）
    pub timestamp: String,
}

impl TodoChangedMessage {
    pub fn new(action: TodoAction, todo: Todo) -> Self {
        let timestamp = unix_seconds(&todo.updated_at);
        Self {
            action,
            todo,
            timestamp,
        }
    }
}

/// `todo-list-updates-{roomId}` に配信するメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListChangedMessage {
    pub action: String,
    pub room_id: RoomId,
    pub timestamp: String,
}

impl TodoListChangedMessage {
    pub fn new(room_id: RoomId) -> Self {
        Self::at(room_id, Utc::now())
    }

    pub fn at(room_id: RoomId, now: DateTime<Utc>) -> Self {
        Self {
            action: LIST_UPDATED_ACTION.to_string(),
            room_id,
            timestamp: unix_seconds(&now),
        }
    }
}

fn unix_seconds(at: &DateTime<Utc>) -> String {
    at.timestamp().to_string()
}
