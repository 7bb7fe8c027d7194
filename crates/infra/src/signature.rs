//! # QStash 署名検証
//!
//! `Upstash-Signature` ヘッダーの JWT（HS256）を検証し、トークンがリクエストボディに
//! 紐付いていることを確認する。
//!
//! ## 1 つの鍵での検証
//!
//! 1. 署名を鍵で検証する（アルゴリズムは HS256 のみ）
//! 2. `iss` が `"Upstash"` であること
//! 3. `exp` を過ぎていないこと（1 秒の時計ずれを許容）。`nbf` があれば開始前でないこと
//! 4. `QSTASH_URL` が設定されていれば `sub` がそれと一致すること
//! 5. `body` クレームと、生のリクエストボディの SHA-256 を base64url にした値が
//!    末尾の `=` を除いて一致すること（定数時間比較）
//!
//! ## 鍵ローテーション
//!
//! current 鍵で失敗したら next 鍵で検証する。どちらかで成功すれば受理する。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{error::SignatureError, secret::SecretString};

/// QStash が発行するトークンの `iss`
pub const QSTASH_ISSUER: &str = "Upstash";

/// `exp` / `nbf` の許容誤差（秒）
const CLOCK_SKEW_SECS: u64 = 1;

#[derive(Debug, Deserialize)]
struct QStashClaims {
    #[serde(default)]
    sub:  Option<String>,
    body: String,
}

/// 検証結果
#[derive(Debug)]
pub enum VerificationResult {
    Accepted,
    /// 鍵ごとの失敗理由（呼び出し元には返さず、ログにのみ出す）
    Rejected {
        current: SignatureError,
        next:    SignatureError,
    },
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// 生のリクエストボディから `body` クレームの期待値を計算する
///
/// SHA-256 ダイジェストを base64url でエンコードし、パディングは付けない。
pub fn body_hash(body: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(body))
}

/// current / next の 2 鍵を持つ QStash 署名検証器
#[derive(Clone)]
pub struct SignatureVerifier {
    current:      SecretString,
    next:         SecretString,
    expected_url: Option<String>,
    validation:   Validation,
}

impl SignatureVerifier {
    pub fn new(current: impl Into<SecretString>, next: impl Into<SecretString>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[QSTASH_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.validate_nbf = true;
        // QStash のトークンは aud を持たない
        validation.validate_aud = false;

        Self {
            current: current.into(),
            next: next.into(),
            expected_url: None,
            validation,
        }
    }

    /// `sub` クレームが一致すべき配信先 URL を設定する
    pub fn with_expected_url(mut self, url: impl Into<String>) -> Self {
        self.expected_url = Some(url.into());
        self
    }

    /// トークンとボディを検証する
    pub fn verify(&self, token: &str, body: &[u8]) -> VerificationResult {
        let current = match self.verify_with_key(&self.current, token, body) {
            Ok(()) => return VerificationResult::Accepted,
            Err(error) => error,
        };
        let next = match self.verify_with_key(&self.next, token, body) {
            Ok(()) => {
                tracing::debug!("next 鍵で QStash 署名を検証しました");
                return VerificationResult::Accepted;
            }
            Err(error) => error,
        };

        tracing::warn!(
            current_key = %current,
            next_key = %next,
            "QStash 署名を検証できません"
        );
        VerificationResult::Rejected { current, next }
    }

    fn verify_with_key(
        &self,
        key: &SecretString,
        token: &str,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        if token.trim().is_empty() {
            return Err(SignatureError::MissingToken);
        }

        let decoding_key = DecodingKey::from_secret(key.expose().as_bytes());
        let claims = jsonwebtoken::decode::<QStashClaims>(token, &decoding_key, &self.validation)?
            .claims;

        let url_matches = self
            .expected_url
            .as_deref()
            .is_none_or(|expected| claims.sub.as_deref() == Some(expected));
        if !url_matches {
            return Err(SignatureError::UrlMismatch);
        }

        let claimed = claims.body.trim_end_matches('=');
        let actual = body_hash(body);
        if !bool::from(claimed.as_bytes().ct_eq(actual.as_bytes())) {
            return Err(SignatureError::BodyHashMismatch);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("current", &self.current)
            .field("next", &self.next)
            .field("expected_url", &self.expected_url)
            .finish_non_exhaustive()
    }
}

/// current / next の 2 鍵でトークンを検証し、受理なら `true`
pub fn verify_signature(current_key: &str, next_key: &str, token: &str, body: &[u8]) -> bool {
    SignatureVerifier::new(current_key, next_key)
        .verify(token, body)
        .is_accepted()
}
