use async_trait::async_trait;
use domain::PublishError;
use redis::AsyncCommands;
use tracing::debug;

/// トピック名で宛先を指定する Pub/Sub サービス
#[async_trait]
pub trait PubSub: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Redis の PUBLISH による実装
///
/// 接続は配信ごとに確立し、配信後に破棄する。
pub struct RedisPubSub {
    client: redis::Client,
}

impl RedisPubSub {
    pub fn new(redis_url: &str) -> Result<Self, PublishError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| PublishError::Connection(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PubSub for RedisPubSub {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        let receivers: i64 = connection
            .publish(topic, payload)
            .await
            .map_err(|e| PublishError::Publish {
                topic: topic.to_string(),
                message: e.to_string(),
            })?;

        debug!(topic, receivers, "Pub/Sub配信完了");
        Ok(())
    }
}
