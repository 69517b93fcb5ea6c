//! 設定とキャッシュが共有する永続キーバリューストア
//!
//! 値はJSONのまま保持する。書き込みのたびに変更通知を配信するので、
//! 字幕オーバーレイは設定画面からの変更をその場で反映できる。
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use crate::error::StorageError;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// 1キー分の変更通知。削除時は `new_value` が `None` になる
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Option<Value>,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            changes,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        notify(&self.changes, key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.entries.lock().await.remove(key);
        if removed.is_some() {
            notify(&self.changes, key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

/// 1つのJSONファイルにすべてのキーを保存するストア
///
/// サーバーとCLIが同じファイルを開くので、メモリ上に内容を持たず
/// 操作のたびにファイルを読み直してから1キー分だけ変更する。
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileStore {
    /// ファイルが無ければ空のストアとして開く。壊れたファイルはここで検出する
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        read_entries(&path).await?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            lock: Mutex::new(()),
            changes,
        })
    }

    async fn persist(&self, entries: &HashMap<String, Value>) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(entries).map_err(StorageError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        // 書き込み途中で落ちても元のファイルが壊れないよう一時ファイル経由で置き換える
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

async fn read_entries(path: &Path) -> Result<HashMap<String, Value>, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
        Ok(content) => serde_json::from_str(&content).map_err(|source| StorageError::Decode {
            key: path.display().to_string(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = read_entries(&self.path).await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let guard = self.lock.lock().await;
        let mut entries = read_entries(&self.path).await?;
        entries.insert(key.to_string(), value.clone());
        self.persist(&entries).await?;
        drop(guard);

        notify(&self.changes, key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let guard = self.lock.lock().await;
        let mut entries = read_entries(&self.path).await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries).await?;
        drop(guard);

        notify(&self.changes, key, None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

fn notify(changes: &broadcast::Sender<StorageChange>, key: &str, new_value: Option<Value>) {
    // 購読者がいなくても書き込み自体は成功扱い
    let _ = changes.send(StorageChange {
        key: key.to_string(),
        new_value,
    });
}
