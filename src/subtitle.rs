use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

impl SubtitleEntry {
    /// 開始・終了とも境界を含む
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// 翻訳サーバーが返し、キャッシュにそのまま保存されるペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub success: bool,
    pub subtitles: Vec<SubtitleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TranslationPayload {
    pub fn new(subtitles: Vec<SubtitleEntry>) -> Self {
        Self {
            success: true,
            subtitles,
            error: None,
            title: None,
            timestamp: None,
        }
    }
}

/// 再生位置を含む最初の字幕を返す。重なりがある場合は並び順で先のものが優先
pub fn find_active(subtitles: &[SubtitleEntry], current_time: f64) -> Option<&SubtitleEntry> {
    subtitles.iter().find(|entry| entry.contains(current_time))
}

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    // エスケープ表記を実改行より先に、CRLFを単独のCR/LFより先に試す
    Regex::new(r"\\r\\n|\\n|\r\n|\n|\r").expect("改行パターンが不正です")
});

/// 改行表現をすべて行区切りとして扱い、行に分割する
///
/// 対象はエスケープされたままの `\n` / `\r\n`（バックスラッシュ付きの文字列）と、
/// 実際の改行文字 `\r\n` / `\n` / `\r`。
pub fn split_lines(text: &str) -> Vec<&str> {
    LINE_BREAK.split(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: f64, end: f64, text: &str) -> SubtitleEntry {
        SubtitleEntry {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn boundary_time_prefers_earlier_entry() {
        let subs = vec![entry(0.0, 2.0, "first"), entry(2.0, 4.0, "second")];

        assert_eq!(find_active(&subs, 2.0).unwrap().text, "first");
        assert_eq!(find_active(&subs, 2.5).unwrap().text, "second");
        assert_eq!(find_active(&subs, 0.0).unwrap().text, "first");
        assert_eq!(find_active(&subs, 4.0).unwrap().text, "second");
        assert!(find_active(&subs, 4.01).is_none());
    }

    #[test]
    fn overlapping_entries_use_sequence_order() {
        let subs = vec![entry(1.0, 10.0, "long"), entry(2.0, 3.0, "short")];
        assert_eq!(find_active(&subs, 2.5).unwrap().text, "long");
    }

    #[test]
    fn empty_sequence_has_no_active_entry() {
        assert!(find_active(&[], 1.0).is_none());
    }

    #[test]
    fn split_handles_every_newline_variant() {
        assert_eq!(split_lines("a\\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\\r\\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("こんにちは\\n世界"), vec!["こんにちは", "世界"]);
        assert_eq!(split_lines("single"), vec!["single"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn mixed_variants_in_one_text() {
        assert_eq!(
            split_lines("一行目\\r\\n二行目\r三行目\r\n四行目"),
            vec!["一行目", "二行目", "三行目", "四行目"]
        );
    }

    #[test]
    fn payload_keeps_server_metadata() {
        let json = r#"{"success":true,"subtitles":[{"start":0,"end":2,"text":"hi"}],"title":"t","timestamp":"2024-01-01T00:00:00"}"#;
        let payload: TranslationPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.subtitles, vec![entry(0.0, 2.0, "hi")]);
        assert_eq!(payload.title.as_deref(), Some("t"));

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["timestamp"], "2024-01-01T00:00:00");
        assert!(back.get("error").is_none());
    }
}
