//! 字幕オーバーレイの幅の見積もりとスタイル計算
//!
//! 実際のレイアウト計測は行わず、半角0.5・全角1.0の文字幅で近似する。
use crate::settings::Settings;
use crate::subtitle::split_lines;

pub const DEFAULT_PADDING_REM: f64 = 1.0;

const PADDING_HORIZONTAL_PX: u32 = 8;
const PADDING_VERTICAL_PX: u32 = 8;
const BORDER_RADIUS_PX: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthEstimate {
    pub max_line_width: f64,
    pub content_width_rem: f64,
    pub final_width_rem: f64,
}

pub fn char_width(ch: char) -> f64 {
    if ch.is_ascii() {
        0.5
    } else {
        1.0
    }
}

pub fn line_width(line: &str) -> f64 {
    line.chars().map(char_width).sum()
}

pub fn estimate_width(text: &str, font_size_rem: f64, padding_rem: f64) -> WidthEstimate {
    let max_line_width = split_lines(text)
        .into_iter()
        .map(line_width)
        .fold(0.0, f64::max);

    let content_width_rem = max_line_width * font_size_rem;

    WidthEstimate {
        max_line_width,
        content_width_rem,
        final_width_rem: content_width_rem + padding_rem,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// `#rrggbb` または `rrggbb` を解釈する。3桁の短縮形は受け付けない
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// オーバーレイ要素に適用するスタイル
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// 色が解釈できない場合は `None`（背景は変更しない）
    pub background: Option<String>,
    pub font_size_rem: f64,
    pub padding: String,
    pub border_radius: String,
    pub width_rem: Option<f64>,
    pub left: &'static str,
    pub transform: &'static str,
}

impl OverlayStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        let background = hex_to_rgb(&settings.bg_color).map(|rgb| {
            format!(
                "rgba({}, {}, {}, {})",
                rgb.r, rgb.g, rgb.b, settings.bg_opacity
            )
        });

        Self {
            background,
            font_size_rem: settings.font_size_rem,
            padding: format!("{}px {}px", PADDING_VERTICAL_PX, PADDING_HORIZONTAL_PX),
            border_radius: format!("{}px", BORDER_RADIUS_PX),
            width_rem: None,
            left: "50%",
            transform: "translateX(-50%)",
        }
    }

    /// 幅・最小幅・最大幅をすべて同じ値に固定する
    pub fn with_width(mut self, estimate: &WidthEstimate) -> Self {
        self.width_rem = Some(estimate.final_width_rem);
        self
    }

    /// インラインCSSとして書き出す
    pub fn to_css(&self) -> String {
        let mut css = Vec::new();
        if let Some(background) = &self.background {
            css.push(format!("background-color: {}", background));
        }
        css.push(format!("font-size: {}rem", self.font_size_rem));
        css.push(format!("padding: {}", self.padding));
        css.push(format!("border-radius: {}", self.border_radius));
        if let Some(width) = self.width_rem {
            css.push(format!("width: {}rem !important", width));
            css.push(format!("min-width: {}rem !important", width));
            css.push(format!("max-width: {}rem !important", width));
        }
        css.push(format!("left: {} !important", self.left));
        css.push(format!("transform: {} !important", self.transform));
        css.join("; ")
    }
}
