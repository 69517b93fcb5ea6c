/// 翻訳ボタンの表示状態。状態ごとの見た目は `ButtonView` に一元化する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Default,
    Loading,
    Translated,
    SubtitleOn,
    SubtitleOff,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub icon: &'static str,
    pub label: &'static str,
    pub disabled: bool,
    pub spinning: bool,
    pub opacity: f32,
    pub delete_visible: bool,
}

impl ButtonState {
    pub fn view(self) -> ButtonView {
        match self {
            ButtonState::Loading => ButtonView {
                icon: "⏳",
                label: "翻訳中...",
                disabled: true,
                spinning: true,
                opacity: 0.6,
                delete_visible: false,
            },
            // 表示直後もオフ時と同じく「字幕ON」を出す
            ButtonState::Translated | ButtonState::SubtitleOff => ButtonView {
                icon: "📺",
                label: "字幕ON",
                disabled: false,
                spinning: false,
                opacity: 1.0,
                delete_visible: true,
            },
            ButtonState::SubtitleOn => ButtonView {
                icon: "🚫",
                label: "字幕OFF",
                disabled: false,
                spinning: false,
                opacity: 1.0,
                delete_visible: true,
            },
            ButtonState::Error => ButtonView {
                icon: "⚠️",
                label: "エラー",
                disabled: false,
                spinning: false,
                opacity: 1.0,
                delete_visible: false,
            },
            ButtonState::Default => ButtonView {
                icon: "🌐",
                label: "AI翻訳",
                disabled: false,
                spinning: false,
                opacity: 1.0,
                delete_visible: false,
            },
        }
    }
}

impl ButtonView {
    /// ボタン内側のマークアップ
    pub fn inner_html(&self) -> String {
        let animation = if self.spinning {
            " display: inline-block; animation: spin 1s linear infinite;"
        } else {
            ""
        };

        format!(
            r#"<span style="font-size: 16px; margin-right: 4px;{}">{}</span><span>{}</span>"#,
            animation, self.icon, self.label
        )
    }

    pub fn delete_display(&self) -> &'static str {
        if self.delete_visible {
            "inline-flex"
        } else {
            "none"
        }
    }
}
