use crate::errors::AppError;
use std::env;
use std::str::FromStr;

/// キーバリューストアのバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// ローカル実行・テスト用
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Configuration(format!(
                "Unknown STORE_BACKEND: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub aws_region: String,
    pub dynamodb_table: String,
    /// DynamoDB Local などのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    pub store_backend: StoreBackend,
    /// 未設定の場合、通知はインメモリに記録されるだけになる
    pub redis_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の変数ソースから設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_backend = match non_empty("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::DynamoDb,
        };

        Ok(Config {
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_table: non_empty("DYNAMODB_TABLE")
                .unwrap_or_else(|| "room-todo-dev".to_string()),
            dynamodb_endpoint: non_empty("DYNAMODB_ENDPOINT"),
            store_backend,
            redis_url: non_empty("REDIS_URL"),
        })
    }

    /// テスト用のインメモリ構成
    pub fn in_memory() -> Self {
        Config {
            environment: "test".to_string(),
            aws_region: "ap-northeast-1".to_string(),
            dynamodb_table: "room-todo-test".to_string(),
            dynamodb_endpoint: None,
            store_backend: StoreBackend::Memory,
            redis_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.environment, "dev");
        assert_eq!(config.aws_region, "ap-northeast-1");
        assert_eq!(config.dynamodb_table, "room-todo-dev");
        assert_eq!(config.store_backend, StoreBackend::DynamoDb);
        assert!(config.dynamodb_endpoint.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DYNAMODB_TABLE", "todos-prod"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
            ("STORE_BACKEND", "Memory"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("ENVIRONMENT", ""),
        ]))
        .unwrap();

        assert_eq!(config.dynamodb_table, "todos-prod");
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.environment, "dev");
    }

    #[test]
    fn test_unknown_backend_is_configuration_error() {
        let result = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "postgres")]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
