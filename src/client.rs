use crate::config::Config;
use crate::error::GatewayError;
use crate::subtitle::{SubtitleEntry, TranslationPayload};
use serde::Deserialize;
use std::time::Duration;

/// 翻訳サーバー（ローカルで動くコンパニオンサーバー）へのHTTPクライアント
#[derive(Debug, Clone)]
pub struct CompanionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
}

/// `/download/{id}` のレスポンス。`subtitles` の有無は呼び出し側で検証する
#[derive(Debug, Deserialize)]
struct DownloadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    subtitles: Option<Vec<SubtitleEntry>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Reachable,
    ServerError(u16),
    Unreachable,
}

impl CompanionClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        Self::with_timeouts(
            config.backend_base_url(),
            config.backend.timeout(),
            config.backend.health_timeout(),
        )
    }

    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Network(format!("HTTPクライアントの作成に失敗しました: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            health_timeout,
        })
    }

    fn video_url(&self, route: &str, video_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            route,
            urlencoding::encode(video_id)
        )
    }

    /// 翻訳済み字幕を取得する。サーバー側の処理に時間がかかるため長めのタイムアウトを使う
    pub async fn download(&self, video_id: &str) -> Result<TranslationPayload, GatewayError> {
        let url = self.video_url("download", video_id);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            return Err(GatewayError::ServerError {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        parse_download_body(&body)
    }

    /// サーバー側の保存データを削除する。レスポンスの中身は見ない
    pub async fn delete_json(&self, video_id: &str) -> Result<(), GatewayError> {
        let url = self.video_url("delete_json", video_id);
        let response = self
            .client
            .delete(&url)
            .timeout(self.health_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::ServerError {
                status: response.status().as_u16(),
                detail: None,
            });
        }

        Ok(())
    }

    pub async fn health_check(&self) -> HealthStatus {
        let url = format!("{}/health", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => HealthStatus::Reachable,
            Ok(response) => HealthStatus::ServerError(response.status().as_u16()),
            Err(e) => {
                log::debug!("ヘルスチェックに失敗しました: {}", e);
                HealthStatus::Unreachable
            }
        }
    }
}

fn parse_download_body(body: &str) -> Result<TranslationPayload, GatewayError> {
    let raw: DownloadResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("JSONパースエラー: {}", e)))?;

    match raw {
        DownloadResponse {
            success: true,
            subtitles: Some(subtitles),
            error,
            title,
            timestamp,
        } => Ok(TranslationPayload {
            success: true,
            subtitles,
            error,
            title,
            timestamp,
        }),
        DownloadResponse { error, .. } => Err(GatewayError::InvalidResponse(
            error.unwrap_or_else(|| "サーバーからの応答が不正です".to_string()),
        )),
    }
}
