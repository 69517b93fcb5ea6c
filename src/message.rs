//! ページ側とゲートウェイ間のメッセージ形式
//!
//! リクエストは `{"type": "translate", "videoId": "..."}` の形で、
//! レスポンスは常に `{success, data | error | message}` を返す。
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Translate {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    GetStatus {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    DeleteTranslation {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    CheckServerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: None,
        }
    }

    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// 見つからなかった場合など、エラー文言なしの失敗
    pub fn not_found() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
            message: None,
        }
    }
}

/// ページ側からゲートウェイへメッセージを送る経路
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, request: Request) -> Response;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_format() {
        let request: Request =
            serde_json::from_value(json!({"type": "translate", "videoId": "v1"})).unwrap();
        assert_eq!(
            request,
            Request::Translate {
                video_id: "v1".to_string()
            }
        );

        let request: Request =
            serde_json::from_value(json!({"type": "check_server_status"})).unwrap();
        assert_eq!(request, Request::CheckServerStatus);

        let value = serde_json::to_value(Request::DeleteTranslation {
            video_id: "v2".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "delete_translation", "videoId": "v2"}));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Request, _> =
            serde_json::from_value(json!({"type": "read_json", "videoId": "v1"}));
        assert!(result.is_err());
    }

    #[test]
    fn response_omits_empty_fields() {
        assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({"success": true}));
        assert_eq!(
            serde_json::to_value(Response::failure("サーバー未起動")).unwrap(),
            json!({"success": false, "error": "サーバー未起動"})
        );
    }
}
