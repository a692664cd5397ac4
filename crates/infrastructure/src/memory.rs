use crate::kv::{KeyValueHandle, KeyValueStore};
use crate::pubsub::PubSub;
use async_trait::async_trait;
use domain::{PublishError, RepositoryError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    // ネームスペース -> (キー -> 値)
    namespaces: HashMap<String, BTreeMap<String, Vec<u8>>>,
    faults: Faults,
}

/// テスト用の障害注入設定
#[derive(Default)]
struct Faults {
    fail_open: bool,
    fail_writes: bool,
    fail_list: bool,
    unreadable_keys: HashSet<String>,
}

/// インメモリのキーバリューストア（ローカル実行/テスト用）
///
/// クローンは同じデータを共有する。
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    state: Arc<Mutex<MemoryState>>,
    open_handles: Arc<AtomicUsize>,
    opened_total: Arc<AtomicUsize>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        lock_state(&self.state)
    }

    /// 現在解放されていないハンドル数
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// これまでに取得されたハンドル数
    pub fn opened_total(&self) -> usize {
        self.opened_total.load(Ordering::SeqCst)
    }

    pub fn keys(&self, namespace: &str) -> Vec<String> {
        self.lock()
            .namespaces
            .get(namespace)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key).cloned())
    }

    /// デコード検証を通さずに値を書き込む
    pub fn insert_raw(&self, namespace: &str, key: &str, value: &[u8]) {
        self.lock()
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.lock().faults.fail_open = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().faults.fail_writes = fail;
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.lock().faults.fail_list = fail;
    }

    /// 指定キーの get を失敗させる
    pub fn make_unreadable(&self, key: &str) {
        self.lock().faults.unreadable_keys.insert(key.to_string());
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn open(&self, namespace: &str) -> Result<Box<dyn KeyValueHandle>, RepositoryError> {
        if self.lock().faults.fail_open {
            return Err(RepositoryError::Store(format!(
                "failed to open database {namespace}"
            )));
        }

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        self.opened_total.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(InMemoryHandle {
            namespace: namespace.to_string(),
            state: Arc::clone(&self.state),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

struct InMemoryHandle {
    namespace: String,
    state: Arc<Mutex<MemoryState>>,
    open_handles: Arc<AtomicUsize>,
}

impl Drop for InMemoryHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueHandle for InMemoryHandle {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        let state = lock_state(&self.state);
        if state.faults.unreadable_keys.contains(key) {
            return Err(RepositoryError::Store(format!("failed to read {key}")));
        }
        Ok(state
            .namespaces
            .get(&self.namespace)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError> {
        let mut state = lock_state(&self.state);
        if state.faults.fail_writes {
            return Err(RepositoryError::Store(format!("failed to write {key}")));
        }
        state
            .namespaces
            .entry(self.namespace.clone())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let state = lock_state(&self.state);
        if state.faults.fail_list {
            return Err(RepositoryError::Store(format!("failed to list {prefix}")));
        }
        Ok(state
            .namespaces
            .get(&self.namespace)
            .map(|entries| {
                entries
                    .keys()
                    .filter(|key| key.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let mut state = lock_state(&self.state);
        if state.faults.fail_writes {
            return Err(RepositoryError::Store(format!("failed to delete {key}")));
        }
        if let Some(entries) = state.namespaces.get_mut(&self.namespace) {
            entries.remove(key);
        }
        Ok(())
    }
}

// パニックしたテストスレッドが残したロックもそのまま使う
fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 配信済みメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// 配信内容を記録するだけの Pub/Sub（ローカル実行/テスト用）
#[derive(Clone, Default)]
pub struct InMemoryPubSub {
    messages: Arc<Mutex<Vec<PublishedMessage>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryPubSub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        lock_state(&self.messages).clone()
    }

    pub fn messages_on(&self, topic: &str) -> Vec<PublishedMessage> {
        lock_state(&self.messages)
            .iter()
            .filter(|message| message.topic == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::Publish {
                topic: topic.to_string(),
                message: "in-memory pubsub configured to fail".to_string(),
            });
        }
        lock_state(&self.messages).push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
