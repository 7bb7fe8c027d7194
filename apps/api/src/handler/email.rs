//! # メール送信ハンドラ
//!
//! `POST /api/emails`。API キー認証は [`require_api_key`](crate::middleware::require_api_key)
//! で済んでいる前提。

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode};

use super::{deliver, parse_email};
use crate::{app_builder::AppState, error::ApiError};

/// メール送信エンドポイント
///
/// - 200: いずれかのプロバイダで配信成功（ボディなし）
/// - 400: ボディが解釈できない、または検証ルール違反
/// - 500: 全プロバイダで配信失敗
#[tracing::instrument(skip_all)]
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let email = parse_email(&body)?;
    deliver(&state.switch, &email).await
}
