//! ページ遷移の検知、ボタンの設置、ページ単位の状態管理
//!
//! 1つのページにつき1つのタスクで動かす。ページ側からの通知は `PageEvent` で受け取り、
//! 遷移後の待ち時間・ボタン挿入の再試行・字幕の再描画はすべてタイマーとして扱う。
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::button::ButtonState;
use crate::config::{Config, PageConfig};
use crate::message::{MessageChannel, Request, Response};
use crate::overlay::SubtitleRenderer;
use crate::page::{parse_video_id, PageSurface};
use crate::settings::Settings;
use crate::storage::StorageChange;
use crate::subtitle::{SubtitleEntry, TranslationPayload};

pub const DELETE_CONFIRM_MESSAGE: &str = "翻訳データを削除しますか？";
pub const DELETE_DONE_MESSAGE: &str = "削除しました";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Uninitialized,
    Initializing,
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    UrlChanged(String),
    TimeUpdate,
    TranslateClicked,
    DeleteClicked,
    Shutdown,
}

/// ページが切り替わるたびに作り直す状態
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    pub video_id: Option<String>,
    pub subtitles: Option<Arc<Vec<SubtitleEntry>>>,
    pub subtitles_displayed: bool,
}

pub struct PageController<P: PageSurface> {
    page: P,
    channel: Arc<dyn MessageChannel>,
    renderer: SubtitleRenderer,
    session: SessionState,
    state: PageState,
    button_state: ButtonState,
    button_inserted: bool,
    last_url: Option<String>,
    pending_init: Option<(String, Instant)>,
    button_retry_at: Option<Instant>,
    config: PageConfig,
}

impl<P: PageSurface> PageController<P> {
    pub fn new(
        page: P,
        channel: Arc<dyn MessageChannel>,
        settings: Settings,
        config: &Config,
    ) -> Self {
        Self {
            page,
            channel,
            renderer: SubtitleRenderer::new(settings, &config.overlay),
            session: SessionState::default(),
            state: PageState::Uninitialized,
            button_state: ButtonState::Default,
            button_inserted: false,
            last_url: None,
            pending_init: None,
            button_retry_at: None,
            config: config.page.clone(),
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn button_state(&self) -> ButtonState {
        self.button_state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// 最初に開いたページ。視聴ページなら待たずに初期化する
    pub async fn load(&mut self, url: &str, now: Instant) {
        self.last_url = Some(url.to_string());
        match parse_video_id(url) {
            Some(video_id) => self.initialize(video_id, now).await,
            None => self.teardown(),
        }
    }

    /// URL変化の通知。同じURLでの重複通知は無視する
    pub fn on_url_change(&mut self, url: &str, now: Instant) {
        if self.last_url.as_deref() == Some(url) {
            return;
        }
        self.last_url = Some(url.to_string());

        match parse_video_id(url) {
            Some(video_id) => {
                if self.session.video_id.as_deref() == Some(video_id.as_str())
                    && self.pending_init.is_none()
                {
                    // 同じ動画のままクエリだけ変わった場合
                    return;
                }
                log::info!("視聴ページへの遷移を検知しました: {}", video_id);
                self.pending_init = Some((video_id, now + self.config.navigation_settle()));
            }
            None => {
                self.pending_init = None;
                self.teardown();
            }
        }
    }

    /// 前のページの状態を片付けてから、ボタン設置と既存翻訳の確認を行う
    pub async fn initialize(&mut self, video_id: String, now: Instant) {
        self.teardown();
        self.state = PageState::Initializing;
        self.session.video_id = Some(video_id.clone());

        self.try_insert_button(now);

        let response = self
            .channel
            .send(Request::GetStatus {
                video_id: video_id.clone(),
            })
            .await;

        if self.session.video_id.as_deref() != Some(video_id.as_str()) {
            return;
        }

        match payload_from(&response) {
            Some(payload) => {
                log::info!("既存の翻訳が見つかりました: {}", video_id);
                self.session.subtitles = Some(Arc::new(payload.subtitles));
                self.state = PageState::Ready;
                self.set_button(ButtonState::SubtitleOff);
            }
            None => {
                self.state = PageState::Idle;
                self.set_button(ButtonState::Default);
            }
        }
    }

    /// 翻訳ボタンのクリック。新規翻訳が必要な場合は対象の動画IDを返す
    pub fn on_translate_click(&mut self) -> Option<String> {
        if self.state == PageState::Loading {
            return None;
        }

        if let Some(subtitles) = self.session.subtitles.clone() {
            self.session.subtitles_displayed = !self.session.subtitles_displayed;
            if self.session.subtitles_displayed {
                self.set_button(ButtonState::SubtitleOn);
                self.renderer.enable(&mut self.page, subtitles);
            } else {
                self.set_button(ButtonState::SubtitleOff);
                self.renderer.disable(&mut self.page);
            }
            return None;
        }

        let video_id = self.session.video_id.clone()?;
        self.state = PageState::Loading;
        self.set_button(ButtonState::Loading);
        Some(video_id)
    }

    /// 翻訳レスポンスを反映する。別の動画に移った後の結果は捨てる
    pub fn finish_translate(&mut self, video_id: &str, response: Response) {
        if self.session.video_id.as_deref() != Some(video_id) || self.state != PageState::Loading
        {
            log::debug!("ページが切り替わったため翻訳結果を破棄します: {}", video_id);
            return;
        }

        match payload_from(&response) {
            Some(payload) => {
                let subtitles = Arc::new(payload.subtitles);
                self.session.subtitles = Some(subtitles.clone());
                self.session.subtitles_displayed = true;
                self.state = PageState::Ready;
                self.set_button(ButtonState::Translated);
                self.renderer.enable(&mut self.page, subtitles);
            }
            None => {
                log::error!(
                    "翻訳に失敗しました: {}",
                    response.error.as_deref().unwrap_or("不明なエラー")
                );
                self.state = PageState::Error;
                self.set_button(ButtonState::Error);
            }
        }
    }

    /// クリックから結果反映までをその場で行う
    pub async fn translate_click(&mut self) {
        if let Some(video_id) = self.on_translate_click() {
            let response = self
                .channel
                .send(Request::Translate {
                    video_id: video_id.clone(),
                })
                .await;
            self.finish_translate(&video_id, response);
        }
    }

    pub async fn delete_click(&mut self) {
        if self.session.subtitles.is_none() || self.state == PageState::Loading {
            return;
        }
        let Some(video_id) = self.session.video_id.clone() else {
            return;
        };

        if !self.page.confirm(DELETE_CONFIRM_MESSAGE) {
            return;
        }

        let response = self
            .channel
            .send(Request::DeleteTranslation {
                video_id: video_id.clone(),
            })
            .await;

        if self.session.video_id.as_deref() != Some(video_id.as_str()) {
            return;
        }

        if response.success {
            self.session.subtitles = None;
            self.session.subtitles_displayed = false;
            self.renderer.disable(&mut self.page);
            self.state = PageState::Idle;
            self.set_button(ButtonState::Default);
            self.page.alert(DELETE_DONE_MESSAGE);
        } else {
            let error = response.error.unwrap_or_else(|| "不明なエラー".to_string());
            log::error!("翻訳データの削除に失敗しました: {}", error);
            self.page.alert(&format!("削除に失敗しました: {}", error));
        }
    }

    pub fn on_time_update(&mut self, now: Instant) {
        self.renderer.on_time_update(now);
    }

    pub fn on_settings_change(&mut self, change: &StorageChange) {
        let mut settings = self.renderer.settings().clone();
        if settings.apply_change(change) {
            self.renderer.apply_settings(&mut self.page, settings);
        }
    }

    /// 次にタイマー処理が必要になる時刻
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.pending_init.as_ref().map(|(_, at)| *at),
            self.button_retry_at,
            self.renderer.next_repaint(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub async fn on_timer(&mut self, now: Instant) {
        if let Some((video_id, at)) = self.pending_init.take() {
            if now >= at {
                self.initialize(video_id, now).await;
            } else {
                self.pending_init = Some((video_id, at));
            }
        }

        if let Some(at) = self.button_retry_at {
            if now >= at {
                self.button_retry_at = None;
                self.try_insert_button(now);
            }
        }

        self.renderer.poll(&mut self.page, now);
    }

    fn try_insert_button(&mut self, now: Instant) {
        if self.session.video_id.is_none() || self.button_inserted {
            return;
        }

        if self.page.insert_button() {
            self.button_inserted = true;
            self.page.render_button(&self.button_state.view());
        } else {
            log::debug!("ボタンの挿入先が見つかりません。再試行します");
            self.button_retry_at = Some(now + self.config.button_retry());
        }
    }

    fn set_button(&mut self, state: ButtonState) {
        self.button_state = state;
        if self.button_inserted {
            self.page.render_button(&state.view());
        }
    }

    fn teardown(&mut self) {
        self.renderer.reset(&mut self.page);
        if self.button_inserted {
            self.page.remove_button();
            self.button_inserted = false;
        }
        self.button_retry_at = None;
        self.button_state = ButtonState::Default;
        self.session = SessionState::default();
        self.state = PageState::Uninitialized;
    }
}

fn payload_from(response: &Response) -> Option<TranslationPayload> {
    if !response.success {
        return None;
    }
    let data = response.data.clone()?;
    match serde_json::from_value::<TranslationPayload>(data) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::warn!("字幕データの形式が不正です: {}", e);
            None
        }
    }
}

/// ページ1つ分のイベントループ。`Shutdown` かイベント送信側の破棄で終了し、ページを返す
pub async fn run<P: PageSurface + 'static>(
    mut controller: PageController<P>,
    mut events: mpsc::Receiver<PageEvent>,
    mut settings_changes: broadcast::Receiver<StorageChange>,
) -> P {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(String, Response)>();
    let mut settings_open = true;

    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            event = events.recv() => {
                let now = Instant::now();
                match event {
                    None | Some(PageEvent::Shutdown) => break,
                    Some(PageEvent::UrlChanged(url)) => controller.on_url_change(&url, now),
                    Some(PageEvent::TimeUpdate) => controller.on_time_update(now),
                    Some(PageEvent::TranslateClicked) => {
                        if let Some(video_id) = controller.on_translate_click() {
                            let channel = controller.channel.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let response = channel
                                    .send(Request::Translate { video_id: video_id.clone() })
                                    .await;
                                let _ = done_tx.send((video_id, response));
                            });
                        }
                    }
                    Some(PageEvent::DeleteClicked) => controller.delete_click().await,
                }
            }
            Some((video_id, response)) = done_rx.recv() => {
                controller.finish_translate(&video_id, response);
            }
            change = settings_changes.recv(), if settings_open => match change {
                Ok(change) => controller.on_settings_change(&change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("設定変更の通知を{}件取りこぼしました", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => settings_open = false,
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.on_timer(Instant::now()).await;
            }
        }
    }

    controller.into_page()
}
