#![allow(dead_code)]

use ai_translate_overlay::{
    cache::TranslationCache,
    client::CompanionClient,
    gateway::TranslationGateway,
    storage::{KeyValueStore, MemoryStore},
};
use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// 翻訳サーバーの代わりに立てるモック。呼び出し回数を数える
#[derive(Clone)]
pub struct MockCompanion {
    pub download_status: StatusCode,
    pub download_body: Value,
    pub download_delay: Duration,
    pub delete_status: StatusCode,
    pub health_status: StatusCode,
    pub downloads: Arc<AtomicUsize>,
    pub deletes: Arc<AtomicUsize>,
}

impl MockCompanion {
    pub fn returning(body: Value) -> Self {
        Self {
            download_status: StatusCode::OK,
            download_body: body,
            download_delay: Duration::ZERO,
            delete_status: StatusCode::OK,
            health_status: StatusCode::OK,
            downloads: Arc::new(AtomicUsize::new(0)),
            deletes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn router(&self) -> Router {
        let download = self.clone();
        let remove = self.clone();
        let health = self.health_status;

        Router::new()
            .route(
                "/download/{video_id}",
                get(move |Path(_video_id): Path<String>| {
                    let mock = download.clone();
                    async move {
                        mock.downloads.fetch_add(1, Ordering::SeqCst);
                        if !mock.download_delay.is_zero() {
                            tokio::time::sleep(mock.download_delay).await;
                        }
                        (mock.download_status, Json(mock.download_body.clone())).into_response()
                    }
                }),
            )
            .route(
                "/delete_json/{video_id}",
                delete(move |Path(_video_id): Path<String>| {
                    let mock = remove.clone();
                    async move {
                        mock.deletes.fetch_add(1, Ordering::SeqCst);
                        mock.delete_status.into_response()
                    }
                }),
            )
            .route("/health", get(move || async move { health.into_response() }))
    }

    /// 空きポートで起動し、ベースURLを返す
    pub async fn spawn(&self) -> String {
        serve_router(self.router()).await
    }
}

pub async fn serve_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// 接続を受け付けないアドレス（一度確保したポートを閉じて使う）
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

pub fn gateway_for(base_url: &str, timeout: Duration) -> (TranslationGateway, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = CompanionClient::with_timeouts(base_url, timeout, Duration::from_secs(3))
        .expect("client");
    let dyn_store: Arc<dyn KeyValueStore> = store.clone();
    let gateway = TranslationGateway::new(client, TranslationCache::new(dyn_store));
    (gateway, store)
}
