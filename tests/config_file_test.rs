use std::fs;
use ai_translate_overlay::config::Config;

fn temp_config_path() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("ai_translate_overlay_config_{}.toml", uuid::Uuid::new_v4()));
    path
}

#[test]
fn test_load_config_from_file() {
    let path = temp_config_path();

    // 8889を指す設定ファイルを作成（overlay/pageは省略してデフォルトを使う）
    let toml = r#"
[server]
host = "127.0.0.1"
port = 8891

[backend]
base_url = "http://127.0.0.1:8889/"
timeout_seconds = 120

[storage]
path = "cache/storage.json"
"#;

    fs::write(&path, toml).expect("設定ファイルの作成に失敗しました");

    let config = Config::load_or_create_default(&path).expect("設定ファイルの読み込みに失敗しました");
    assert_eq!(config.backend_base_url(), "http://127.0.0.1:8889");
    assert_eq!(config.backend.timeout_seconds, 120);
    assert_eq!(config.backend.health_timeout_seconds, 3);
    assert_eq!(config.server.port, 8891);
    assert_eq!(config.overlay.debounce_ms, 100);
    assert_eq!(config.overlay.padding_rem, 1.0);
    assert_eq!(config.page.button_retry_ms, 1000);
    assert_eq!(config.page.navigation_settle_ms, 500);

    // 片付け（ベストエフォート）
    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_config_file_is_created_with_defaults() {
    let path = temp_config_path();

    let config = Config::load_or_create_default(&path).expect("デフォルト設定の作成に失敗しました");
    assert_eq!(config.backend.base_url, "http://localhost:8888");
    assert_eq!(config.backend.timeout_seconds, 300);
    assert!(path.exists());

    let reloaded = Config::load_or_create_default(&path).expect("再読み込みに失敗しました");
    assert_eq!(reloaded.server_address(), config.server_address());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.server.port = 0;
    assert!(config.validate().is_err());

    config.server.port = 8890;
    config.backend.base_url = String::new();
    assert!(config.validate().is_err());

    config.backend.base_url = "localhost without scheme".to_string();
    assert!(config.validate().is_err());

    config.backend.base_url = "http://localhost:8888".to_string();
    config.backend.timeout_seconds = 0;
    assert!(config.validate().is_err());

    config.backend.timeout_seconds = 300;
    config.storage.path = " ".to_string();
    assert!(config.validate().is_err());

    config.storage.path = "storage.json".to_string();
    config.overlay.debounce_ms = 0;
    assert!(config.validate().is_err());

    config.overlay.debounce_ms = 100;
    config.overlay.padding_rem = -1.0;
    assert!(config.validate().is_err());

    config.overlay.padding_rem = 1.0;
    config.page.button_retry_ms = 0;
    assert!(config.validate().is_err());

    config.page.button_retry_ms = 1000;
    assert!(config.validate().is_ok());
}
