//! # インフラ層エラー定義
//!
//! 起動時のプロバイダ設定エラー、配信時のトランスポートエラー、
//! Webhook 署名の検証エラーを表現する。
//!
//! ## 構造
//!
//! - [`InfraError`]: 起動時エラー。種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持する
//! - [`TransportError`]: 1 回の配信試行が失敗した理由。[`EmailSwitch`](crate::EmailSwitch)
//!   の境界を越えず、ログにのみ現れる
//! - [`SignatureError`]: 1 つの鍵による署名検証が失敗した理由。呼び出し元には返さない

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生する起動時エラー
///
/// convenience constructor で生成すると、その時点のスパン情報が
/// 自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// プロバイダ設定ドキュメント全体が不正（JSON でない、配列でない）
    #[error("プロバイダ設定ドキュメントが不正です: {0}")]
    ProviderDocument(String),

    /// id が一致したレコードの必須フィールド欠落・型不一致
    #[error("プロバイダ設定が不正です ({provider}): {message}")]
    ProviderConfig {
        /// プロバイダ id（例: "smtp"）
        provider: String,
        message:  String,
    },

    /// HTTP クライアント等の初期化失敗
    #[error("トランスポートを初期化できません: {0}")]
    Transport(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    fn with_kind(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    // ===== Convenience constructors =====

    pub fn provider_document(message: impl Into<String>) -> Self {
        Self::with_kind(InfraErrorKind::ProviderDocument(message.into()))
    }

    pub fn provider_config(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(InfraErrorKind::ProviderConfig {
            provider: provider.into(),
            message:  message.into(),
        })
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::with_kind(InfraErrorKind::Transport(message.into()))
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

/// 1 回の配信試行の失敗理由
#[derive(Debug, Error)]
pub enum TransportError {
    /// 接続失敗・タイムアウト・TLS エラーなど
    #[error("HTTP 通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    /// 2xx 以外のステータス
    #[error("プロバイダがエラーを返しました (status={status}): {body}")]
    Status { status: u16, body: String },

    /// メッセージを組み立てられない（アドレスの形式不正など）
    #[error("メッセージを構築できません: {0}")]
    Message(String),

    #[error("SMTP エラー: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// 1 つの鍵による署名検証の失敗理由
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("署名トークンがありません")]
    MissingToken,

    /// 形式不正・署名不一致・issuer 不一致・期限切れなど
    #[error("トークンを検証できません: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("body クレームがリクエストボディのハッシュと一致しません")]
    BodyHashMismatch,

    #[error("sub クレームが配信先 URL と一致しません")]
    UrlMismatch,
}
