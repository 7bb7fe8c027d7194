//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は api の責務
//! - 認証失敗と送信失敗の detail は固定文言とし、失敗理由を呼び出し元に漏らさない

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://mailswitch.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"invalid-signature"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 400 Validation Error
    pub fn validation_error(detail: impl Into<String>) -> Self {
        Self::new("validation-error", "Validation Error", 400, detail)
    }

    /// 400 Invalid Signature
    ///
    /// 署名検証のどの段階で失敗したかは返さない。
    pub fn invalid_signature() -> Self {
        Self::new(
            "invalid-signature",
            "Invalid Signature",
            400,
            "署名を検証できませんでした",
        )
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::new("unauthorized", "Unauthorized", 401, "認証に失敗しました")
    }

    /// 500 Delivery Failed
    ///
    /// どのプロバイダがなぜ失敗したかは返さない。
    pub fn delivery_failed() -> Self {
        Self::new(
            "delivery-failed",
            "Delivery Failed",
            500,
            "メールを送信できませんでした",
        )
    }
}
