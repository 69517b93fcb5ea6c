use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use crate::subtitle::TranslationPayload;

/// 動画IDをキーにした翻訳結果のキャッシュ。有効期限や追い出しは持たない
#[derive(Clone)]
pub struct TranslationCache {
    store: Arc<dyn KeyValueStore>,
}

impl TranslationCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 字幕リストを持たないレコードはキャッシュなしとして扱う
    pub async fn get(&self, video_id: &str) -> Result<Option<TranslationPayload>, StorageError> {
        let Some(value) = self.store.get(video_id).await? else {
            return Ok(None);
        };

        if value.get("subtitles").map_or(true, |subs| subs.is_null()) {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: video_id.to_string(),
                source,
            })
    }

    pub async fn put(&self, video_id: &str, payload: &TranslationPayload) -> Result<(), StorageError> {
        let value = serde_json::to_value(payload).map_err(StorageError::Serialize)?;
        self.store.set(video_id, value).await?;
        log::info!("翻訳結果をキャッシュしました: {}", video_id);
        Ok(())
    }

    pub async fn remove(&self, video_id: &str) -> Result<(), StorageError> {
        self.store.remove(video_id).await
    }
}
