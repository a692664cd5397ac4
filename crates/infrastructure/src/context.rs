use crate::dynamodb::{DynamoDbClient, DynamoDbKeyValueStore};
use crate::kv::KeyValueStore;
use crate::memory::{InMemoryKeyValueStore, InMemoryPubSub};
use crate::notifications::TodoNotifier;
use crate::pubsub::{PubSub, RedisPubSub};
use crate::repositories::{RoomRepository, TodoRepository};
use shared::{AppError, Config, StoreBackend};
use std::sync::Arc;
use tracing::{info, warn};

/// ハンドラーが利用する永続化・通知サービス一式
#[derive(Clone)]
pub struct ServiceContext {
    pub todos: TodoRepository,
    pub rooms: RoomRepository,
    pub notifier: TodoNotifier,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn KeyValueStore>, pubsub: Arc<dyn PubSub>) -> Self {
        Self {
            todos: TodoRepository::new(Arc::clone(&store)),
            rooms: RoomRepository::new(store),
            notifier: TodoNotifier::new(pubsub),
        }
    }

    /// 設定に従ってバックエンドを選択する
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = match config.store_backend {
            StoreBackend::DynamoDb => {
                info!(table = %config.dynamodb_table, "DynamoDBバックエンドを使用");
                Arc::new(DynamoDbKeyValueStore::new(DynamoDbClient::new(config).await))
            }
            StoreBackend::Memory => {
                info!("インメモリバックエンドを使用");
                Arc::new(InMemoryKeyValueStore::new())
            }
        };

        let pubsub: Arc<dyn PubSub> = match &config.redis_url {
            Some(url) => Arc::new(
                RedisPubSub::new(url).map_err(|e| AppError::Configuration(e.to_string()))?,
            ),
            None => {
                warn!("REDIS_URLが未設定のため通知はインメモリに記録されます");
                Arc::new(InMemoryPubSub::new())
            }
        };

        Ok(Self::new(store, pubsub))
    }

    /// インメモリバックエンドで構成する（テスト・ローカル実行用）
    pub fn in_memory() -> (Self, InMemoryKeyValueStore, InMemoryPubSub) {
        let store = InMemoryKeyValueStore::new();
        let pubsub = InMemoryPubSub::new();
        let context = Self::new(Arc::new(store.clone()), Arc::new(pubsub.clone()));
        (context, store, pubsub)
    }
}
