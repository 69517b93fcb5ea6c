//! 字幕の見た目に関するユーザー設定
//!
//! 設定画面とページ内オーバーレイの両方から読み書きされる。保存形式は
//! `fontSizeRem` / `bgColor` / `bgOpacity` の3キーで、キャッシュと同じストアに置く。
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::layout::hex_to_rgb;
use crate::storage::{KeyValueStore, StorageChange};

pub const KEY_FONT_SIZE_REM: &str = "fontSizeRem";
pub const KEY_BG_COLOR: &str = "bgColor";
pub const KEY_BG_OPACITY: &str = "bgOpacity";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub font_size_rem: f64,
    pub bg_color: String,
    pub bg_opacity: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size_rem: 1.5,
            bg_color: "#000000".to_string(),
            bg_opacity: 0.75,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.font_size_rem.is_finite() || self.font_size_rem <= 0.0 {
            return Err(anyhow::anyhow!(
                "フォントサイズは0より大きい値を指定してください: {}",
                self.font_size_rem
            ));
        }

        if hex_to_rgb(&self.bg_color).is_none() {
            return Err(anyhow::anyhow!(
                "背景色は#rrggbb形式で指定してください: {}",
                self.bg_color
            ));
        }

        if !(0.0..=1.0).contains(&self.bg_opacity) {
            return Err(anyhow::anyhow!(
                "背景の透明度は0から1の範囲で指定してください: {}",
                self.bg_opacity
            ));
        }

        Ok(())
    }

    /// 変更通知を反映する。設定のキーでなければ何もしない
    ///
    /// 値が削除された場合や型が合わない場合はそのキーをデフォルトに戻す。
    pub fn apply_change(&mut self, change: &StorageChange) -> bool {
        let defaults = Settings::default();
        let value = change.new_value.as_ref();

        match change.key.as_str() {
            KEY_FONT_SIZE_REM => {
                self.font_size_rem = value
                    .and_then(Value::as_f64)
                    .filter(|v| *v > 0.0)
                    .unwrap_or(defaults.font_size_rem);
                true
            }
            KEY_BG_COLOR => {
                self.bg_color = value
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or(defaults.bg_color);
                true
            }
            KEY_BG_OPACITY => {
                self.bg_opacity = value
                    .and_then(Value::as_f64)
                    .map(|v| v.clamp(0.0, 1.0))
                    .unwrap_or(defaults.bg_opacity);
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 未保存のキーはデフォルト値で補う
    pub async fn load(&self) -> Result<Settings, StorageError> {
        let mut settings = Settings::default();

        for key in [KEY_FONT_SIZE_REM, KEY_BG_COLOR, KEY_BG_OPACITY] {
            if let Some(value) = self.store.get(key).await? {
                settings.apply_change(&StorageChange {
                    key: key.to_string(),
                    new_value: Some(value),
                });
            }
        }

        Ok(settings)
    }

    pub async fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        self.set_font_size_rem(settings.font_size_rem).await?;
        self.set_bg_color(&settings.bg_color).await?;
        self.set_bg_opacity(settings.bg_opacity).await
    }

    pub async fn set_font_size_rem(&self, value: f64) -> Result<(), StorageError> {
        self.store.set(KEY_FONT_SIZE_REM, Value::from(value)).await
    }

    pub async fn set_bg_color(&self, value: &str) -> Result<(), StorageError> {
        self.store.set(KEY_BG_COLOR, Value::from(value)).await
    }

    pub async fn set_bg_opacity(&self, value: f64) -> Result<(), StorageError> {
        self.store.set(KEY_BG_OPACITY, Value::from(value)).await
    }

    pub async fn reset(&self) -> Result<Settings, StorageError> {
        let defaults = Settings::default();
        self.save(&defaults).await?;
        Ok(defaults)
    }
}
