use crate::message::{MessageChannel, Request, Response};
use async_trait::async_trait;
use std::time::Duration;

/// ブリッジサーバーの `/api/message` 経由でゲートウェイに届けるチャネル
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChannel {
    /// 翻訳は数分かかることがあるので、タイムアウトは翻訳サーバー側と揃える
    pub fn new(bridge_base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/message", bridge_base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl MessageChannel for HttpChannel {
    async fn send(&self, request: Request) -> Response {
        let result = async {
            let response = self.client.post(&self.endpoint).json(&request).send().await?;
            response.error_for_status()?.json::<Response>().await
        }
        .await;

        result.unwrap_or_else(|e| {
            log::error!("ブリッジサーバーとの通信に失敗しました: {}", e);
            Response::failure(format!("ブリッジサーバーとの通信に失敗しました: {}", e))
        })
    }
}
