use crate::kv::{KeyValueHandle, KeyValueStore};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use domain::RepositoryError;
use shared::Config;
use std::collections::HashMap;
use tracing::debug;

/// パーティションキー（ネームスペース）
pub const NAMESPACE_ATTRIBUTE: &str = "Namespace";
/// ソートキー（階層キー全体）
pub const KEY_ATTRIBUTE: &str = "Key";
/// 値（JSON バイト列）
pub const VALUE_ATTRIBUTE: &str = "Value";

pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_dynamodb::config::Region::new(config.aws_region.clone()));

        // DynamoDB Local 用のエンドポイント上書き
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;
        let client = Client::new(&aws_config);

        Self {
            client,
            table_name: config.dynamodb_table.clone(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// DynamoDB テーブルをキーバリューストアとして使う実装
///
/// テーブル構造: `Namespace` (S, PK) / `Key` (S, SK) / `Value` (B)
pub struct DynamoDbKeyValueStore {
    client: Client,
    table_name: String,
}

impl DynamoDbKeyValueStore {
    pub fn new(db: DynamoDbClient) -> Self {
        Self {
            client: db.client,
            table_name: db.table_name,
        }
    }
}

#[async_trait]
impl KeyValueStore for DynamoDbKeyValueStore {
    async fn open(&self, namespace: &str) -> Result<Box<dyn KeyValueHandle>, RepositoryError> {
        Ok(Box::new(DynamoDbHandle {
            client: self.client.clone(),
            table_name: self.table_name.clone(),
            namespace: namespace.to_string(),
        }))
    }
}

struct DynamoDbHandle {
    client: Client,
    table_name: String,
    namespace: String,
}

impl DynamoDbHandle {
    fn namespace_value(&self) -> AttributeValue {
        AttributeValue::S(self.namespace.clone())
    }
}

#[async_trait]
impl KeyValueHandle for DynamoDbHandle {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(NAMESPACE_ATTRIBUTE, self.namespace_value())
            .key(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| store_error("GetItem", e))?;

        let Some(item) = output.item() else {
            return Ok(None);
        };

        match item.get(VALUE_ATTRIBUTE).and_then(|v| v.as_b().ok()) {
            Some(blob) => Ok(Some(blob.as_ref().to_vec())),
            None => Err(RepositoryError::Decode {
                key: key.to_string(),
                message: format!("{VALUE_ATTRIBUTE} attribute is missing or not binary"),
            }),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(NAMESPACE_ATTRIBUTE, self.namespace_value())
            .item(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .item(VALUE_ATTRIBUTE, AttributeValue::B(Blob::new(value)))
            .send()
            .await
            .map_err(|e| store_error("PutItem", e))?;

        debug!(table = %self.table_name, key, "PutItem完了");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let mut keys = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;

        // 1MB 単位のページングを最後まで辿る
        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#ns = :ns AND begins_with(#k, :prefix)")
                .expression_attribute_names("#ns", NAMESPACE_ATTRIBUTE)
                .expression_attribute_names("#k", KEY_ATTRIBUTE)
                .expression_attribute_values(":ns", self.namespace_value())
                .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string()))
                .projection_expression("#k")
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| store_error("Query", e))?;

            keys.extend(output.items().iter().filter_map(|item| {
                item.get(KEY_ATTRIBUTE)
                    .and_then(|v| v.as_s().ok())
                    .cloned()
            }));

            match output.last_evaluated_key() {
                Some(last_key) if !last_key.is_empty() => {
                    exclusive_start_key = Some(last_key.clone());
                }
                _ => break,
            }
        }

        debug!(table = %self.table_name, prefix, count = keys.len(), "Query完了");
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(NAMESPACE_ATTRIBUTE, self.namespace_value())
            .key(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| store_error("DeleteItem", e))?;

        debug!(table = %self.table_name, key, "DeleteItem完了");
        Ok(())
    }
}

fn store_error<E>(operation: &str, error: E) -> RepositoryError
where
    E: std::error::Error + 'static,
{
    RepositoryError::Store(format!(
        "DynamoDB {operation} failed: {}",
        DisplayErrorContext(&error)
    ))
}
