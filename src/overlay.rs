//! 再生位置に合わせて字幕オーバーレイを描き替える
use std::sync::Arc;

use tokio::time::Instant;

use crate::config::OverlayConfig;
use crate::debounce::Debouncer;
use crate::layout::{estimate_width, OverlayStyle, WidthEstimate};
use crate::page::PageSurface;
use crate::settings::Settings;
use crate::subtitle::{find_active, split_lines, SubtitleEntry};

pub struct SubtitleRenderer {
    subtitles: Option<Arc<Vec<SubtitleEntry>>>,
    enabled: bool,
    overlay_created: bool,
    settings: Settings,
    padding_rem: f64,
    repaint: Debouncer,
}

impl SubtitleRenderer {
    pub fn new(settings: Settings, config: &OverlayConfig) -> Self {
        Self {
            subtitles: None,
            enabled: false,
            overlay_created: false,
            settings,
            padding_rem: config.padding_rem,
            repaint: Debouncer::new(config.debounce()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 字幕を保持して表示を開始する。初回描画はすぐに行う
    pub fn enable<P: PageSurface>(&mut self, page: &mut P, subtitles: Arc<Vec<SubtitleEntry>>) {
        self.subtitles = Some(subtitles);
        self.enabled = true;

        if !self.ensure_overlay(page) {
            log::debug!("プレイヤーが見つからないため字幕要素を作成できません");
            return;
        }

        self.repaint_now(page);
    }

    /// 表示を止めて非表示にする。要素は再利用のため残す
    pub fn disable<P: PageSurface>(&mut self, page: &mut P) {
        self.enabled = false;
        self.repaint.cancel();
        if self.overlay_created {
            page.hide_overlay();
        }
    }

    /// ページ切り替え時に要素ごと破棄する
    pub fn reset<P: PageSurface>(&mut self, page: &mut P) {
        self.enabled = false;
        self.subtitles = None;
        self.repaint.cancel();
        if self.overlay_created {
            page.remove_overlay();
            self.overlay_created = false;
        }
    }

    /// 再生位置が変わるたびに呼ばれる。描画は一定時間まとめてから行う
    pub fn on_time_update(&mut self, now: Instant) {
        if self.enabled && self.subtitles.is_some() {
            self.repaint.schedule(now);
        }
    }

    pub fn next_repaint(&self) -> Option<Instant> {
        self.repaint.deadline()
    }

    /// 予約済みの描画が期限に達していれば実行する
    pub fn poll<P: PageSurface>(&mut self, page: &mut P, now: Instant) -> bool {
        if self.repaint.fire_if_due(now) {
            self.repaint_now(page);
            true
        } else {
            false
        }
    }

    pub fn apply_settings<P: PageSurface>(&mut self, page: &mut P, settings: Settings) {
        self.settings = settings;
        if self.overlay_created {
            page.style_overlay(&OverlayStyle::from_settings(&self.settings));
        }
    }

    /// 現在の再生位置に該当する字幕を表示し、無ければ隠す
    pub fn repaint_now<P: PageSurface>(&mut self, page: &mut P) -> Option<WidthEstimate> {
        // 有効化の時点でプレイヤーが無かった場合はここで作り直す
        if !self.enabled || !self.ensure_overlay(page) {
            return None;
        }
        let subtitles = self.subtitles.as_ref()?;
        let current_time = page.current_time()?;

        match find_active(subtitles, current_time).filter(|entry| !entry.text.is_empty()) {
            Some(entry) => {
                let lines: Vec<String> = split_lines(&entry.text)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                let estimate =
                    estimate_width(&entry.text, self.settings.font_size_rem, self.padding_rem);
                log::debug!(
                    "字幕幅を計算しました: 最大行幅={} 最終幅={}rem",
                    estimate.max_line_width,
                    estimate.final_width_rem
                );

                let style = OverlayStyle::from_settings(&self.settings).with_width(&estimate);
                page.show_overlay(&lines, &style);
                Some(estimate)
            }
            None => {
                page.hide_overlay();
                None
            }
        }
    }

    fn ensure_overlay<P: PageSurface>(&mut self, page: &mut P) -> bool {
        if !self.overlay_created && page.create_overlay() {
            self.overlay_created = true;
            page.style_overlay(&OverlayStyle::from_settings(&self.settings));
        }
        self.overlay_created
    }
}
