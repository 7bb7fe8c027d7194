//! # HTTP リクエストハンドラ
//!
//! - [`email`] - `POST /api/emails`
//! - [`qstash`] - `POST /api/qstash`
//! - [`health`] - `/health`, `/health/ready`

pub mod email;
pub mod health;
pub mod qstash;

use axum::http::StatusCode;
pub use email::send_email;
pub use health::{health_check, readiness_check};
use mailswitch_domain::{EmailMessage, EmailRequest};
use mailswitch_infra::EmailSwitch;
pub use qstash::receive_qstash;

use crate::error::ApiError;

/// 生のボディを解釈して検証済みメッセージにする
pub(crate) fn parse_email(body: &[u8]) -> Result<EmailMessage, ApiError> {
    let request: EmailRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "リクエストボディを解釈できません");
        ApiError::undeserializable_body()
    })?;

    request.into_message().map_err(|e| {
        tracing::debug!(error = %e, "リクエストが検証ルールに違反");
        ApiError::from(e)
    })
}

/// フェイルオーバー配信し、成功なら空の 200
pub(crate) async fn deliver(
    switch: &EmailSwitch,
    email: &EmailMessage,
) -> Result<StatusCode, ApiError> {
    if switch.send(email).await {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::DeliveryFailed)
    }
}
