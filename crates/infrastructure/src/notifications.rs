use crate::pubsub::PubSub;
use domain::{PublishError, RoomId, Todo, TodoAction, TodoChangedMessage, TodoListChangedMessage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// ToDo 単体の変更を配信するトピック
pub fn todo_updates_topic(room_id: &RoomId) -> String {
    format!("todo-updates-{}", room_id.as_str())
}

/// ToDo 一覧の変更を配信するトピック
pub fn todo_list_updates_topic(room_id: &RoomId) -> String {
    format!("todo-list-updates-{}", room_id.as_str())
}

/// ToDo 変更のリアルタイム通知
///
/// 配信はベストエフォートで、失敗しても呼び出し元の処理は成功扱いとする。
#[derive(Clone)]
pub struct TodoNotifier {
    pubsub: Arc<dyn PubSub>,
}

impl TodoNotifier {
    pub fn new(pubsub: Arc<dyn PubSub>) -> Self {
        Self { pubsub }
    }

    pub async fn notify_todo_changed(
        &self,
        action: TodoAction,
        todo: &Todo,
    ) -> Result<(), PublishError> {
        let topic = todo_updates_topic(&todo.room_id);
        let message = TodoChangedMessage::new(action, todo.clone());
        self.publish_json(&topic, &message).await
    }

    pub async fn notify_list_changed(&self, room_id: &RoomId) -> Result<(), PublishError> {
        let topic = todo_list_updates_topic(room_id);
        let message = TodoListChangedMessage::new(room_id.clone());
        self.publish_json(&topic, &message).await
    }

    /// 失敗をログに残して握りつぶす
    pub async fn broadcast_todo_changed(&self, action: TodoAction, todo: &Todo) {
        if let Err(e) = self.notify_todo_changed(action, todo).await {
            warn!(
                error = %e,
                action = %action,
                todo_id = %todo.id,
                room_id = %todo.room_id,
                "ToDo変更通知の配信に失敗しました"
            );
        }
    }

    /// 失敗をログに残して握りつぶす
    pub async fn broadcast_list_changed(&self, room_id: &RoomId) {
        if let Err(e) = self.notify_list_changed(room_id).await {
            warn!(error = %e, room_id = %room_id, "一覧変更通知の配信に失敗しました");
        }
    }

    async fn publish_json<T: Serialize>(&self, topic: &str, message: &T) -> Result<(), PublishError> {
        let payload =
            serde_json::to_vec(message).map_err(|e| PublishError::Serialization(e.to_string()))?;
        self.pubsub.publish(topic, &payload).await?;

        debug!(topic, "通知配信完了");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPubSub;

    fn room(id: &str) -> RoomId {
        RoomId::from_string(id.to_string()).unwrap()
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(todo_updates_topic(&room("r1")), "todo-updates-r1");
        assert_eq!(todo_list_updates_topic(&room("r1")), "todo-list-updates-r1");
    }

    #[tokio::test]
    async fn test_notify_todo_changed() {
        let pubsub = InMemoryPubSub::new();
        let notifier = TodoNotifier::new(Arc::new(pubsub.clone()));
        let todo = Todo::new(room("r1"), "Buy milk".to_string()).unwrap();

        notifier
            .notify_todo_changed(TodoAction::Updated, &todo)
            .await
            .unwrap();

        let messages = pubsub.messages_on("todo-updates-r1");
        assert_eq!(messages.len(), 1);
        let json = messages[0].json().unwrap();
        assert_eq!(json["action"], "updated");
        assert_eq!(json["todo"]["id"], todo.id.as_str());
        assert_eq!(json["timestamp"], todo.updated_at.timestamp().to_string());
    }

    #[tokio::test]
    async fn test_notify_list_changed() {
        let pubsub = InMemoryPubSub::new();
        let notifier = TodoNotifier::new(Arc::new(pubsub.clone()));

        notifier.notify_list_changed(&room("r1")).await.unwrap();

        let messages = pubsub.messages_on("todo-list-updates-r1");
        assert_eq!(messages.len(), 1);
        let json = messages[0].json().unwrap();
        assert_eq!(json["action"], "list-updated");
        assert_eq!(json["roomId"], "r1");
        assert!(json["timestamp"].as_str().unwrap().parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_swallows_failures() {
        let pubsub = InMemoryPubSub::new();
        pubsub.set_fail(true);
        let notifier = TodoNotifier::new(Arc::new(pubsub.clone()));
        let todo = Todo::new(room("r1"), "Buy milk".to_string()).unwrap();

        assert!(notifier
            .notify_todo_changed(TodoAction::Created, &todo)
            .await
            .is_err());

        notifier.broadcast_todo_changed(TodoAction::Created, &todo).await;
        notifier.broadcast_list_changed(&room("r1")).await;
        assert!(pubsub.messages().is_empty());
    }
}
