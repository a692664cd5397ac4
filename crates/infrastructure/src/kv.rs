use async_trait::async_trait;
use domain::RepositoryError;

/// 階層キーを持つキーバリューストア
///
/// `open` でネームスペース（`/todos`, `/rooms`）ごとのハンドルを取得する。
/// ハンドルは drop 時に解放される。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn open(&self, namespace: &str) -> Result<Box<dyn KeyValueHandle>, RepositoryError>;
}

/// ネームスペースに束縛されたストアハンドル
#[async_trait]
pub trait KeyValueHandle: Send + Sync {
    fn namespace(&self) -> &str;

    /// キーが存在しない場合は `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError>;

    /// 無条件に上書きする
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError>;

    /// prefix で始まるキーの一覧（順序は保証しない）
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError>;

    /// 存在しないキーの削除も成功として扱う
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;
}
