use domain::{DomainError, RepositoryError};
use thiserror::Error;

/// ハンドラー層で扱うエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // クライアントエラー
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // インフラストラクチャエラー
    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),


    // システムエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
}

impl AppError {
    /// エラーコードを取得
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Deserialization(_) => "DESERIALIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation(_) | AppError::Deserialization(_) | AppError::NotFound(_) => {
                ErrorCategory::Client
            }
            _ => ErrorCategory::Server,
        }
    }

    /// HTTPステータスコードを取得
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::Deserialization(_) => 400,
            AppError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// レスポンスの message に載せる文言
    ///
    /// クライアントエラーはハンドラーが付けた文言、サーバーエラーは下位層の生のエラー文字列。
    pub fn client_message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Deserialization(msg)
            | AppError::NotFound(msg)
            | AppError::Store(msg)
            | AppError::Serialization(msg)
            | AppError::Configuration(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// エラーをログに記録
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("none");
        match self.category() {
            ErrorCategory::Client => {
                tracing::info!(
                    error = %self,
                    code = self.code(),
                    status = self.http_status_code(),
                    request_id,
                    "Client error occurred"
                );
            }
            ErrorCategory::Server => {
                tracing::error!(
                    error = %self,
                    code = self.code(),
                    status = self.http_status_code(),
                    request_id,
                    "Error occurred"
                );
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => AppError::Validation(msg),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(key) => AppError::NotFound(format!("Key not found: {key}")),
            // 保存済みデータの破損はサーバー側の問題として扱う
            RepositoryError::Decode { .. } => AppError::Internal(error.to_string()),
            RepositoryError::Store(msg) => AppError::Store(msg),
            RepositoryError::Serialization(msg) => AppError::Serialization(msg),
        }
    }
}
