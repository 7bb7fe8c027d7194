//! # MailSwitch サーバー
//!
//! メール送信 API のエントリーポイント。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p mailswitch-api
//!
//! # 本番環境（環境変数を直接指定）
//! ROOT_API_KEY=... PROVIDERS_FILE=/etc/mailswitch/providers.json LOG_FORMAT=json \
//!     cargo run -p mailswitch-api --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use mailswitch_api::{AppState, build_app, config::ApiConfig};
use mailswitch_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. 設定とプロバイダ設定の読み込み（失敗したら起動しない）
/// 4. ルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("mailswitch"));

    let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;
    let providers = config
        .providers
        .load()
        .context("プロバイダ設定の読み込みに失敗しました")?;
    let state = AppState::from_config(&config, &providers)
        .context("プロバイダ設定からトランスポートを構築できません")?;

    tracing::info!(
        transports = ?state.switch.transport_names(),
        qstash = state.verifier.is_some(),
        "MailSwitch サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let app = build_app(&config, Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("MailSwitch サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
