//! # トランスポート
//!
//! 1 通のメールを 1 つの配信手段で送る処理を抽象化する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: [`EmailTransport`] で HTTP API と SMTP を同じ形で扱う
//! - **bool 契約**: 呼び出し側（[`EmailSwitch`](crate::EmailSwitch)）には成否のみを返す。
//!   失敗理由は [`deliver`](EmailTransport::deliver) の [`TransportError`] として
//!   ログに出す
//! - **リトライなし**: 1 回の呼び出しで 1 回だけ外部に接続する

mod brevo;
mod dry_run;
mod resend;
mod sendgrid;
mod smtp;

use std::time::Duration;

use async_trait::async_trait;
pub use brevo::{BrevoConfig, BrevoTransport};
pub use dry_run::{TestConfig, TestTransport};
use mailswitch_domain::EmailMessage;
pub use resend::{ResendConfig, ResendTransport};
use reqwest::header::ACCEPT;
pub use sendgrid::{SendGridConfig, SendGridTransport};
use serde::Serialize;
pub use smtp::{SmtpConfig, SmtpTls, SmtpTransport};

use crate::{
    error::{InfraError, TransportError},
    secret::SecretString,
};

/// 外部 API / SMTP 呼び出しのデフォルトタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// `timeout_secs` を検証して [`Duration`] にする
///
/// 0 は設定エラー。
pub(crate) fn timeout_from_secs(provider: &str, secs: u64) -> Result<Duration, InfraError> {
    if secs == 0 {
        return Err(InfraError::provider_config(
            provider,
            "timeout_secs は 1 以上で指定してください",
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// API トークンが空白でないことを確認する
pub(crate) fn require_token(provider: &str, token: &SecretString) -> Result<(), InfraError> {
    if token.is_blank() {
        return Err(InfraError::provider_config(provider, "token が空です"));
    }
    Ok(())
}

/// メール配信トランスポート
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// ログに出す識別名（例: `"resend"`）
    fn name(&self) -> &'static str;

    /// メールを 1 回だけ配信し、失敗理由を返す
    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError>;

    /// メールを配信し、成否のみを返す
    ///
    /// 失敗理由は WARN ログに出し、呼び出し元には伝えない。
    async fn send(&self, email: &EmailMessage) -> bool {
        match self.deliver(email).await {
            Ok(()) => {
                tracing::debug!(transport = self.name(), "メールを配信しました");
                true
            }
            Err(error) => {
                tracing::warn!(
                    transport = self.name(),
                    error = %error,
                    "メール配信に失敗"
                );
                false
            }
        }
    }
}

/// JSON を POST する HTTP API 向けの共通クライアント
///
/// `Accept: application/json` を付与し、2xx 以外を [`TransportError::Status`] にする。
#[derive(Debug, Clone)]
pub(crate) struct JsonApiClient {
    client:   reqwest::Client,
    endpoint: String,
}

impl JsonApiClient {
    pub(crate) fn new(
        provider: &str,
        endpoint: String,
        timeout_secs: u64,
    ) -> Result<Self, InfraError> {
        let timeout = timeout_from_secs(provider, timeout_secs)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                InfraError::transport(format!("{provider} の HTTP クライアント初期化失敗: {e}"))
            })?;

        Ok(Self { client, endpoint })
    }

    /// JSON ボディを POST する
    ///
    /// `auth_header` は `(ヘッダー名, 値)`。
    pub(crate) async fn post_json<T: Serialize + ?Sized>(
        &self,
        auth_header: (&'static str, String),
        body: &T,
    ) -> Result<(), TransportError> {
        let (name, value) = auth_header;
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(name, value)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // エラーボディの読み取り失敗はステータスだけで報告する
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
