//! 動画ページ側の操作をまとめたトレイト
//!
//! 要素の挿入や再生位置の取得など、ブラウザ側でしか出来ない処理はすべてここを通す。
use crate::button::ButtonView;
use crate::layout::OverlayStyle;

pub const WATCH_PATH: &str = "/watch";

pub trait PageSurface: Send {
    /// ボタンの挿入先がまだ無ければ `false`
    fn insert_button(&mut self) -> bool;

    fn remove_button(&mut self);

    fn render_button(&mut self, view: &ButtonView);

    /// 動画要素が無ければ `None`
    fn current_time(&self) -> Option<f64>;

    /// プレイヤーのコンテナが無ければ `false`
    fn create_overlay(&mut self) -> bool;

    fn show_overlay(&mut self, lines: &[String], style: &OverlayStyle);

    fn style_overlay(&mut self, style: &OverlayStyle);

    fn hide_overlay(&mut self);

    fn remove_overlay(&mut self);

    fn confirm(&mut self, message: &str) -> bool;

    fn alert(&mut self, message: &str);
}

/// 視聴ページのURLから動画IDを取り出す
pub fn parse_video_id(url: &str) -> Option<String> {
    let url = reqwest::Url::parse(url).ok()?;
    if url.path() != WATCH_PATH {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
