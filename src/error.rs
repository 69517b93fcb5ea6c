//! ストレージと翻訳ゲートウェイのエラー定義
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ストレージファイルの読み書きに失敗しました: {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ストレージのシリアライズに失敗しました")]
    Serialize(#[source] serde_json::Error),
    #[error("保存データの形式が不正です: {key}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("ローカルサーバーに接続できません")]
    ConnectionRefused,
    #[error("サーバーがタイムアウトしました")]
    Timeout,
    #[error("サーバーエラー: HTTP {status}{}", format_detail(.detail))]
    ServerError { status: u16, detail: Option<String> },
    #[error("無効なレスポンス: {0}")]
    InvalidResponse(String),
    #[error("ストレージエラー: {0}")]
    StorageError(#[from] StorageError),
    #[error("無効なリクエスト: {0}")]
    InvalidRequest(String),
    #[error("ネットワークエラー: {0}")]
    Network(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GatewayError::Timeout
        } else if error.is_connect() {
            GatewayError::ConnectionRefused
        } else if error.is_decode() {
            GatewayError::InvalidResponse(format!("JSONパースエラー: {}", error))
        } else if let Some(status) = error.status() {
            GatewayError::ServerError {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            GatewayError::Network(error.to_string())
        }
    }
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => format!(" ({})", detail.trim()),
        _ => String::new(),
    }
}
