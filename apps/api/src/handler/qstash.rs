//! # QStash Webhook ハンドラ
//!
//! `POST /api/qstash`。`QSTASH` が有効な場合のみルーティングされる。
//!
//! 署名はボディのハッシュに紐付いているため、ボディは JSON として解釈する前の
//! 生バイト列のまま検証する。

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use super::{deliver, parse_email};
use crate::{app_builder::AppState, error::ApiError};

/// 署名トークンを運ぶヘッダー
pub const UPSTASH_SIGNATURE: &str = "upstash-signature";

/// QStash Webhook エンドポイント
///
/// - 200: 署名が正しく、いずれかのプロバイダで配信成功
/// - 400: 署名ヘッダーがない、署名検証に失敗、またはボディ不正
/// - 500: 全プロバイダで配信失敗
#[tracing::instrument(skip_all)]
pub async fn receive_qstash(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let verifier = state.verifier.as_ref().ok_or(ApiError::InvalidSignature)?;

    let Some(token) = headers
        .get(UPSTASH_SIGNATURE)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Upstash-Signature ヘッダーがありません");
        return Err(ApiError::InvalidSignature);
    };

    if !verifier.verify(token, &body).is_accepted() {
        return Err(ApiError::InvalidSignature);
    }

    let email = parse_email(&body)?;
    deliver(&state.switch, &email).await
}
