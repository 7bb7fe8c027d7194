//! # アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use mailswitch_infra::{EmailSwitch, InfraError, ProviderRegistry, SignatureVerifier};
use mailswitch_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::ApiConfig,
    handler::{health_check, readiness_check, receive_qstash, send_email},
    middleware::{ApiKeyState, require_api_key},
};

/// ハンドラ間で共有する State
///
/// 起動後は変更しない。
pub struct AppState {
    pub switch:   Arc<EmailSwitch>,
    /// `None` なら `/api/qstash` を公開しない
    pub verifier: Option<SignatureVerifier>,
}

impl AppState {
    /// 設定とプロバイダ設定ドキュメントから State を組み立てる
    pub fn from_config(config: &ApiConfig, providers: &str) -> Result<Self, InfraError> {
        let transports = ProviderRegistry::with_builtin_providers().build_from_str(providers)?;
        if transports.is_empty() {
            tracing::warn!("有効なトランスポートがありません。全ての送信は失敗します");
        }

        Ok(Self {
            switch:   Arc::new(EmailSwitch::new(transports)),
            verifier: config.qstash.as_ref().map(|qstash| qstash.verifier()),
        })
    }
}

/// ルーターを構築する
pub fn build_app(config: &ApiConfig, state: Arc<AppState>) -> Router {
    let api_key_state = ApiKeyState {
        root_api_key: config.root_api_key.clone(),
    };

    let emails = Router::new()
        .route("/api/emails", post(send_email))
        .route_layer(from_fn_with_state(api_key_state, require_api_key));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .merge(emails);

    if state.verifier.is_some() {
        app = app.route("/api/qstash", post(receive_qstash));
    }

    // レイヤー順序: 下に書いたものが外側
    // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
    // 2. TraceLayer: request_id を含むスパンを作る
    // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
    // 4. CanonicalLogLineLayer: スパン内でサマリログを 1 行出力
    app.with_state(state)
        .layer(CanonicalLogLineLayer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
