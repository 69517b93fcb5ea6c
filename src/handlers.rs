use crate::gateway::TranslationGateway;
use crate::message::{Request, Response};
use axum::{
    extract::{Path, State},
    response::Json,
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: TranslationGateway,
}

impl AppState {
    pub fn new(gateway: TranslationGateway) -> Self {
        Self { gateway }
    }
}

/// メッセージ形式そのままの受け口
pub async fn post_message(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Json<Response> {
    let request: Request = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("不明なメッセージを受信しました: {}", e);
            return Json(Response::failure(format!("不明なメッセージです: {}", e)));
        }
    };

    Json(state.gateway.dispatch(request).await)
}

pub async fn translate(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Json<Response> {
    Json(state.gateway.dispatch(Request::Translate { video_id }).await)
}

pub async fn translation_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Json<Response> {
    Json(state.gateway.dispatch(Request::GetStatus { video_id }).await)
}

pub async fn delete_translation(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Json<Response> {
    Json(
        state
            .gateway
            .dispatch(Request::DeleteTranslation { video_id })
            .await,
    )
}

pub async fn server_health(State(state): State<AppState>) -> Json<Response> {
    Json(state.gateway.dispatch(Request::CheckServerStatus).await)
}
