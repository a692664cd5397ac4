use crate::errors::DomainError;
use crate::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ToDo の識別子
///
/// 新規作成時は ULID を採番する。クライアントから受け取った値は
/// 不透明な文字列としてそのまま扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("TodoId must not be empty".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ルームに属する ToDo
///
/// `id` と `room_id` はストレージキーを構成するため作成後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub room_id: RoomId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// 未完了の ToDo を新規作成
    pub fn new(room_id: RoomId, text: String) -> Result<Self, DomainError> {
        Self::new_at(room_id, text, Utc::now())
    }

    pub fn new_at(room_id: RoomId, text: String, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_text(&text)?;

        Ok(Self {
            id: TodoId::new(),
            room_id,
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// テキストと完了状態を上書きする
    pub fn apply_update(&mut self, text: String, completed: bool) -> Result<(), DomainError> {
        self.apply_update_at(text, completed, Utc::now())
    }

    pub fn apply_update_at(
        &mut self,
        text: String,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        validate_text(&text)?;

        self.text = text;
        self.completed = completed;
        self.updated_at = now;
        Ok(())
    }

    pub fn belongs_to(&self, room_id: &RoomId) -> bool {
        &self.room_id == room_id
    }
}

fn validate_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation("Text is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn room() -> RoomId {
        RoomId::from_string("room1".to_string()).unwrap()
    }

    #[test]
    fn test_new_todo_is_incomplete() {
        let todo = Todo::new(room(), "Buy milk".to_string()).unwrap();

        assert!(!todo.id.as_str().is_empty());
        assert_eq!(todo.id.as_str().len(), 26);
        assert_eq!(todo.room_id, room());
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn test_new_todo_rejects_blank_text() {
        assert_eq!(
            Todo::new(room(), "".to_string()),
            Err(DomainError::Validation("Text is required".to_string()))
        );
        assert!(Todo::new(room(), "   ".to_string()).is_err());
    }

    #[test]
    fn test_update_preserves_identity() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let mut todo = Todo::new_at(room(), "Buy milk".to_string(), created).unwrap();
        let original = todo.clone();

        todo.apply_update_at("Buy oat milk".to_string(), true, later)
            .unwrap();

        assert_eq!(todo.id, original.id);
        assert_eq!(todo.room_id, original.room_id);
        assert_eq!(todo.created_at, created);
        assert_eq!(todo.updated_at, later);
        assert_eq!(todo.text, "Buy oat milk");
        assert!(todo.completed);
    }

    #[test]
    fn test_failed_update_leaves_todo_untouched() {
        let mut todo = Todo::new(room(), "Buy milk".to_string()).unwrap();
        let original = todo.clone();

        assert!(todo.apply_update("".to_string(), true).is_err());
        assert_eq!(todo, original);
    }

    #[test]
    fn test_todo_json_uses_camel_case() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let mut todo = Todo::new_at(room(), "Buy milk".to_string(), created).unwrap();
        todo.id = TodoId::from_string("t1".to_string()).unwrap();

        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["id"], "t1");
        assert_eq!(value["roomId"], "room1");
        assert_eq!(value["text"], "Buy milk");
        assert_eq!(value["completed"], false);
        assert!(value["createdAt"]
            .as_str()
            .unwrap()
            .starts_with("2024-05-01T12:30:00"));
        assert!(value.get("room_id").is_none());

        let decoded: Todo = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, todo);
    }

    #[test]
    fn test_todo_id_rejects_empty() {
        assert!(TodoId::from_string(String::new()).is_err());
        assert_eq!(
            TodoId::from_string("abc".to_string()).unwrap().to_string(),
            "abc"
        );
    }
}
