//! # API キー認証ミドルウェア
//!
//! `Authorization: <scheme> <token>` の token が `ROOT_API_KEY` と一致するか検証する。
//!
//! - ヘッダーを空白で区切ってちょうど 2 要素であること（scheme は問わない）
//! - token の比較は定数時間で行う
//! - 失敗時は理由を返さず 401

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use mailswitch_infra::SecretString;
use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// API キー認証の状態
#[derive(Clone)]
pub struct ApiKeyState {
    pub root_api_key: SecretString,
}

/// `Authorization` ヘッダーの値が API キーと一致するか
pub fn matches_api_key(header_value: &str, expected: &SecretString) -> bool {
    let mut parts = header_value.split_whitespace();
    let (Some(_scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    token.as_bytes().ct_eq(expected.expose().as_bytes()).into()
}

/// API キー認証ミドルウェア
pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| matches_api_key(value, &state.root_api_key));

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "API キー認証に失敗");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bearer("Bearer root-key", true)]
    #[case::scheme不問("Token root-key", true)]
    #[case::連続した空白("Bearer   root-key", true)]
    #[case::tokenなし("Bearer", false)]
    #[case::要素が多い("Bearer root-key extra", false)]
    #[case::token不一致("Bearer other-key", false)]
    #[case::前方一致は不可("Bearer root-key-suffix", false)]
    #[case::空("", false)]
    fn test_authorizationヘッダーの判定(#[case] header: &str, #[case] expected: bool) {
        let key = SecretString::new("root-key");

        assert_eq!(matches_api_key(header, &key), expected);
    }
}
