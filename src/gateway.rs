use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::cache::TranslationCache;
use crate::client::{CompanionClient, HealthStatus};
use crate::error::GatewayError;
use crate::message::{MessageChannel, Request, Response};
use crate::subtitle::TranslationPayload;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerHealth {
    pub reachable: bool,
    pub message: String,
}

/// キャッシュを優先し、無ければ翻訳サーバーから取得するゲートウェイ
#[derive(Clone)]
pub struct TranslationGateway {
    client: CompanionClient,
    cache: TranslationCache,
}

impl TranslationGateway {
    pub fn new(client: CompanionClient, cache: TranslationCache) -> Self {
        Self { client, cache }
    }

    pub async fn translate(&self, video_id: &str) -> Result<TranslationPayload, GatewayError> {
        let video_id = require_video_id(video_id)?;
        log::info!("翻訳リクエスト: {}", video_id);

        if let Some(cached) = self.cached(video_id).await {
            log::info!("キャッシュ済みの翻訳を使用します: {}", video_id);
            return Ok(cached);
        }

        log::info!("翻訳サーバーから取得します: {}", video_id);
        let payload = self.client.download(video_id).await.map_err(|e| {
            log::error!("翻訳に失敗しました ({}): {}", video_id, e);
            e
        })?;

        // キャッシュ保存の失敗は利用者には見せない
        if let Err(e) = self.cache.put(video_id, &payload).await {
            log::warn!("キャッシュの保存に失敗しました ({}): {}", video_id, e);
        }

        log::info!("翻訳完了: {} ({}件)", video_id, payload.subtitles.len());
        Ok(payload)
    }

    /// キャッシュのみを参照する。ネットワークには出ない
    pub async fn get_status(&self, video_id: &str) -> Option<TranslationPayload> {
        let video_id = require_video_id(video_id).ok()?;
        self.cached(video_id).await
    }

    /// ローカルの削除が済めば成功。サーバー側の削除は失敗しても無視する
    pub async fn delete_translation(&self, video_id: &str) -> Result<(), GatewayError> {
        let video_id = require_video_id(video_id)?;

        self.cache.remove(video_id).await?;
        log::info!("キャッシュを削除しました: {}", video_id);

        if let Err(e) = self.client.delete_json(video_id).await {
            log::warn!("サーバー側の削除に失敗しました（無視します） ({}): {}", video_id, e);
        }

        Ok(())
    }

    pub async fn check_server_health(&self) -> ServerHealth {
        match self.client.health_check().await {
            HealthStatus::Reachable => ServerHealth {
                reachable: true,
                message: "AI翻訳サーバー起動中".to_string(),
            },
            HealthStatus::ServerError(status) => {
                log::warn!("ヘルスチェックでHTTP {}が返りました", status);
                ServerHealth {
                    reachable: false,
                    message: "サーバーエラー".to_string(),
                }
            }
            HealthStatus::Unreachable => ServerHealth {
                reachable: false,
                message: "サーバー未起動".to_string(),
            },
        }
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Translate { video_id } => match self.translate(&video_id).await {
                Ok(payload) => Response::with_data(json!(payload)),
                Err(e) => Response::failure(e.to_string()),
            },
            Request::GetStatus { video_id } => match self.get_status(&video_id).await {
                Some(payload) => Response::with_data(json!(payload)),
                None => Response::not_found(),
            },
            Request::DeleteTranslation { video_id } => {
                match self.delete_translation(&video_id).await {
                    Ok(()) => Response::ok(),
                    Err(e) => Response::failure(e.to_string()),
                }
            }
            Request::CheckServerStatus => {
                let health = self.check_server_health().await;
                if health.reachable {
                    Response::with_message(health.message)
                } else {
                    Response::failure(health.message)
                }
            }
        }
    }

    /// 読み込みエラーはキャッシュなしとして扱う
    async fn cached(&self, video_id: &str) -> Option<TranslationPayload> {
        match self.cache.get(video_id).await {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("キャッシュの読み込みに失敗しました ({}): {}", video_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl MessageChannel for TranslationGateway {
    async fn send(&self, request: Request) -> Response {
        self.dispatch(request).await
    }
}

fn require_video_id(video_id: &str) -> Result<&str, GatewayError> {
    let trimmed = video_id.trim();
    if trimmed.is_empty() {
        Err(GatewayError::InvalidRequest(
            "動画IDが指定されていません".to_string(),
        ))
    } else {
        Ok(trimmed)
    }
}
