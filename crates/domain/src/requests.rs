use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// POST /room リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateRoomRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Room name is required".to_string()));
        }
        Ok(())
    }
}

/// POST /todo リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub text: String,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::Validation("Text is required".to_string()));
        }
        Ok(())
    }
}

/// PUT /todo リクエスト（text と completed の両方が必須）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub text: String,
    pub completed: bool,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::Validation("Text is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_todo_request_missing_text_is_invalid() {
        let req: CreateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_room_request() {
        let req: CreateRoomRequest = serde_json::from_str(r#"{"name":"Kitchen"}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: CreateRoomRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_eq!(
            req.validate(),
            Err(DomainError::Validation("Room name is required".to_string()))
        );
    }

    #[test]
    fn test_update_request_requires_both_fields() {
        assert!(serde_json::from_str::<UpdateTodoRequest>(r#"{"text":"a"}"#).is_err());
        assert!(serde_json::from_str::<UpdateTodoRequest>(r#"{"completed":true}"#).is_err());

        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"text":"Buy milk","completed":true}"#).unwrap();
        assert!(req.completed);
        assert!(req.validate().is_ok());
    }
}
