use thiserror::Error;

/// ドメインモデルのバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),
}

/// 永続化マッピング（キーバリューストア）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Key not found: {0}")]
    NotFound(String),

    /// 保存済みデータが JSON として読めない
    #[error("Decode error at {key}: {message}")]
    Decode { key: String, message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Pub/Sub 配信エラー（呼び出し元には返さない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Publish to {topic} failed: {message}")]
    Publish { topic: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}
