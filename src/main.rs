use ai_translate_overlay::{
    cache::TranslationCache,
    client::CompanionClient,
    config::Config,
    gateway::TranslationGateway,
    handlers::AppState,
    settings::SettingsStore,
    storage::{JsonFileStore, KeyValueStore},
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "AI翻訳字幕のブリッジサーバーと設定ツール")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        help = "設定ファイルのパス。存在しなければデフォルト設定で作成します"
    )]
    config: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// ブリッジサーバーを起動する（省略時のデフォルト）
    Serve,
    /// 動画の翻訳を取得する（キャッシュ優先）
    Translate { video_id: String },
    /// キャッシュ済みの翻訳を表示する
    Status { video_id: String },
    /// 翻訳データを削除する
    Delete { video_id: String },
    /// 翻訳サーバーの起動状態を確認する
    Health,
    /// 字幕の表示設定
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long, help = "フォントサイズ (rem)")]
        font_size: Option<f64>,
        #[arg(long, help = "背景色 (#rrggbb)")]
        bg_color: Option<String>,
        #[arg(long, help = "背景の不透明度 (0.0〜1.0)")]
        bg_opacity: Option<f64>,
    },
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = Config::load_or_create_default(&cli.config)
        .with_context(|| format!("設定ファイルの読み込みに失敗しました: {}", cli.config))?;
    config.validate()?;

    let store: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::open(config.storage.path_buf())
            .await
            .context("ストレージを開けませんでした")?,
    );
    let client = CompanionClient::new(&config)?;
    let gateway = TranslationGateway::new(client, TranslationCache::new(store.clone()));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, gateway).await?,
        Command::Translate { video_id } => {
            let payload = gateway.translate(&video_id).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Status { video_id } => match gateway.get_status(&video_id).await {
            Some(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
            None => println!("翻訳データはありません: {}", video_id),
        },
        Command::Delete { video_id } => {
            gateway.delete_translation(&video_id).await?;
            println!("削除しました: {}", video_id);
        }
        Command::Health => {
            let health = gateway.check_server_health().await;
            println!("{}", health.message);
            if !health.reachable {
                std::process::exit(1);
            }
        }
        Command::Settings { action } => {
            let settings_store = SettingsStore::new(store);
            run_settings(&settings_store, action).await?;
        }
    }

    Ok(())
}

async fn serve(config: Config, gateway: TranslationGateway) -> anyhow::Result<()> {
    println!("AI翻訳ブリッジサーバーを起動中...");
    println!("翻訳サーバー: {}", config.backend.base_url);
    println!("保存先: {}", config.storage.path);

    let addr: SocketAddr = config
        .server_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("無効なサーバーアドレス: {}", e))?;

    let app = ai_translate_overlay::create_app(AppState::new(gateway));

    println!("ブリッジサーバーを起動します: http://{}", addr);
    println!("APIエンドポイント:");
    println!("  POST   /api/message - メッセージ形式のリクエスト");
    println!("  GET    /api/translate/{{id}} - 翻訳の取得");
    println!("  GET    /api/status/{{id}} - キャッシュ済み翻訳の確認");
    println!("  DELETE /api/translation/{{id}} - 翻訳データの削除");
    println!("  GET    /api/health - 翻訳サーバーの状態確認");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("ブリッジサーバーの起動に失敗: {}", e))?;

    Ok(())
}

async fn run_settings(store: &SettingsStore, action: SettingsAction) -> anyhow::Result<()> {
    let settings = match action {
        SettingsAction::Show => store.load().await?,
        SettingsAction::Set {
            font_size,
            bg_color,
            bg_opacity,
        } => {
            let mut settings = store.load().await?;
            if let Some(font_size) = font_size {
                settings.font_size_rem = font_size;
            }
            if let Some(bg_color) = bg_color {
                settings.bg_color = bg_color;
            }
            if let Some(bg_opacity) = bg_opacity {
                settings.bg_opacity = bg_opacity;
            }
            settings.validate()?;
            store.save(&settings).await?;
            settings
        }
        SettingsAction::Reset => store.reset().await?,
    };

    println!("フォントサイズ: {}rem", settings.font_size_rem);
    println!("背景色: {}", settings.bg_color);
    println!("背景の不透明度: {}%", (settings.bg_opacity * 100.0).round());
    Ok(())
}
