use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub page: PageConfig,
}

/// ブリッジサーバーの待ち受け設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 翻訳サーバー（コンパニオンサーバー）への接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    #[serde(default = "BackendConfig::default_health_timeout_seconds")]
    pub health_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "OverlayConfig::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "OverlayConfig::default_padding_rem")]
    pub padding_rem: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "PageConfig::default_button_retry_ms")]
    pub button_retry_ms: u64,
    #[serde(default = "PageConfig::default_navigation_settle_ms")]
    pub navigation_settle_ms: u64,
}

impl BackendConfig {
    const fn default_health_timeout_seconds() -> u64 {
        3
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }
}

impl StorageConfig {
    pub fn path_buf(&self) -> PathBuf {
        Path::new(&self.path).to_path_buf()
    }
}

impl OverlayConfig {
    const fn default_debounce_ms() -> u64 {
        100
    }

    const fn default_padding_rem() -> f64 {
        1.0
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
            padding_rem: Self::default_padding_rem(),
        }
    }
}

impl PageConfig {
    const fn default_button_retry_ms() -> u64 {
        1000
    }

    const fn default_navigation_settle_ms() -> u64 {
        500
    }

    pub fn button_retry(&self) -> Duration {
        Duration::from_millis(self.button_retry_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            button_retry_ms: Self::default_button_retry_ms(),
            navigation_settle_ms: Self::default_navigation_settle_ms(),
        }
    }
}

impl Config {
    pub fn load_or_create_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let default_config = Self::default();
            let content = toml::to_string(&default_config)?;
            fs::write(path, content)?;
            log::info!("デフォルト設定ファイルを作成しました: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("サーバーポートが無効です"));
        }

        if self.backend.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("翻訳サーバーのURLが設定されていません"));
        }

        if reqwest::Url::parse(&self.backend.base_url).is_err() {
            return Err(anyhow::anyhow!(
                "翻訳サーバーのURLが不正です: {}",
                self.backend.base_url
            ));
        }

        if self.backend.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("翻訳タイムアウトが無効です"));
        }

        if self.backend.health_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("ヘルスチェックのタイムアウトが無効です"));
        }

        if self.storage.path.trim().is_empty() {
            return Err(anyhow::anyhow!("保存先ファイルが設定されていません"));
        }

        if self.overlay.debounce_ms == 0 {
            return Err(anyhow::anyhow!("字幕更新の間隔が無効です"));
        }

        if !self.overlay.padding_rem.is_finite() || self.overlay.padding_rem < 0.0 {
            return Err(anyhow::anyhow!("字幕の余白が無効です"));
        }

        if self.page.button_retry_ms == 0 {
            return Err(anyhow::anyhow!("ボタン挿入の再試行間隔が無効です"));
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 末尾のスラッシュを除いたベースURL
    pub fn backend_base_url(&self) -> &str {
        self.backend.base_url.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8890,
            },
            backend: BackendConfig {
                base_url: "http://localhost:8888".to_string(),
                timeout_seconds: 300,
                health_timeout_seconds: BackendConfig::default_health_timeout_seconds(),
            },
            storage: StorageConfig {
                path: "storage.json".to_string(),
            },
            overlay: OverlayConfig::default(),
            page: PageConfig::default(),
        }
    }
}
