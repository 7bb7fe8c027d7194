//! # API エラーハンドリング
//!
//! ハンドラとミドルウェアが返すエラーを RFC 9457 Problem Details の
//! レスポンスに変換する。
//!
//! 認証失敗と配信失敗は固定文言で返し、どの検証・どのプロバイダで
//! 失敗したかは呼び出し元に伝えない（理由はログにのみ出す）。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailswitch_domain::EmailValidationError;
use mailswitch_shared::ErrorResponse;
use thiserror::Error;

/// ボディを [`EmailRequest`](mailswitch_domain::EmailRequest) として解釈できない場合の詳細
pub const UNDESERIALIZABLE_BODY: &str = "Can't deserialize body";

/// API エラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// API キー認証の失敗（401）
    #[error("認証に失敗しました")]
    Unauthorized,

    /// Webhook 署名の検証失敗（400）
    #[error("署名を検証できませんでした")]
    InvalidSignature,

    /// ボディの形式不正（400）
    #[error("{0}")]
    BadRequest(String),

    /// 検証ルール違反（400）
    #[error(transparent)]
    Validation(#[from] EmailValidationError),

    /// 全トランスポートで配信失敗（500）
    #[error("メールを送信できませんでした")]
    DeliveryFailed,
}

impl ApiError {
    pub fn undeserializable_body() -> Self {
        Self::BadRequest(UNDESERIALIZABLE_BODY.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Unauthorized => ErrorResponse::unauthorized(),
            Self::InvalidSignature => ErrorResponse::invalid_signature(),
            Self::BadRequest(detail) => ErrorResponse::bad_request(detail.clone()),
            Self::Validation(error) => ErrorResponse::validation_error(error.to_string()),
            Self::DeliveryFailed => ErrorResponse::delivery_failed(),
        };
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}
