use crate::keys::{StorageKeys, ROOMS_NAMESPACE, TODOS_NAMESPACE};
use crate::kv::KeyValueStore;
use domain::{RepositoryError, Room, RoomId, Todo, TodoId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// ルーム内の ToDo 一覧の取得結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListing {
    pub todos: Vec<Todo>,
    /// 読み取り・デコードできずに除外したエントリ数
    pub skipped: usize,
}

/// ToDo の永続化マッピング
///
/// 各操作はストアハンドルを取得し、1単位の処理を行った後に解放する。
#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn KeyValueStore>,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// `/todos/{roomId}/{id}` に無条件で書き込む
    pub async fn put_todo(&self, todo: &Todo) -> Result<(), RepositoryError> {
        let key = StorageKeys::todo(&todo.room_id, &todo.id);
        let value = encode(todo)?;

        let db = self.store.open(TODOS_NAMESPACE).await?;
        db.put(&key, value).await?;

        debug!(key = %key, "ToDo保存完了");
        Ok(())
    }

    /// キーが一致しても、保存内容のルームと ID が要求と異なる場合は NotFound
    pub async fn get_todo(&self, room_id: &RoomId, todo_id: &TodoId) -> Result<Todo, RepositoryError> {
        let key = StorageKeys::todo(room_id, todo_id);

        let db = self.store.open(TODOS_NAMESPACE).await?;
        let value = db
            .get(&key)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(key.clone()))?;

        let todo: Todo = decode(&key, &value)?;
        if !todo.belongs_to(room_id) || &todo.id != todo_id {
            debug!(key = %key, room_id = %todo.room_id, todo_id = %todo.id, "キーと内容が一致しないToDo");
            return Err(RepositoryError::NotFound(key));
        }

        Ok(todo)
    }

    /// ルーム内の ToDo を取得する
    ///
    /// 読み取り・デコードに失敗したエントリと、別ルームの ToDo は黙って除外する。
    /// 順序はストアの列挙順に従う。
    pub async fn list_todos(&self, room_id: &RoomId) -> Result<TodoListing, RepositoryError> {
        let prefix = StorageKeys::todo_prefix(room_id);

        let db = self.store.open(TODOS_NAMESPACE).await?;
        let keys = db.list(&prefix).await?;

        let mut listing = TodoListing::default();
        for key in keys {
            let todo = match db.get(&key).await {
                Ok(Some(value)) => decode::<Todo>(&key, &value),
                Ok(None) => Err(RepositoryError::NotFound(key.clone())),
                Err(e) => Err(e),
            };

            match todo {
                Ok(todo) if todo.belongs_to(room_id) => listing.todos.push(todo),
                Ok(todo) => {
                    debug!(key = %key, room_id = %todo.room_id, "別ルームのToDoを除外");
                    listing.skipped += 1;
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "読み取れないToDoを除外");
                    listing.skipped += 1;
                }
            }
        }

        if listing.skipped > 0 {
            warn!(
                room_id = %room_id,
                skipped = listing.skipped,
                "一部のToDoを一覧から除外しました"
            );
        }

        Ok(listing)
    }

    pub async fn delete_todo(&self, room_id: &RoomId, todo_id: &TodoId) -> Result<(), RepositoryError> {
        let key = StorageKeys::todo(room_id, todo_id);

        let db = self.store.open(TODOS_NAMESPACE).await?;
        db.delete(&key).await?;

        debug!(key = %key, "ToDo削除完了");
        Ok(())
    }
}

/// ルームの永続化マッピング（作成と取得のみ）
#[derive(Clone)]
pub struct RoomRepository {
    store: Arc<dyn KeyValueStore>,
}

impl RoomRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn put_room(&self, room: &Room) -> Result<(), RepositoryError> {
        let key = StorageKeys::room(&room.id);
        let value = encode(room)?;

        let db = self.store.open(ROOMS_NAMESPACE).await?;
        db.put(&key, value).await?;

        debug!(key = %key, "ルーム保存完了");
        Ok(())
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let key = StorageKeys::room(room_id);

        let db = self.store.open(ROOMS_NAMESPACE).await?;
        let value = db
            .get(&key)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(key.clone()))?;

        decode(&key, &value)
    }
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, RepositoryError> {
    serde_json::to_vec(record).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &str, value: &[u8]) -> Result<T, RepositoryError> {
    serde_json::from_slice(value).map_err(|e| RepositoryError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}
