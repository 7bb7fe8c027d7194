//! SMTP トランスポート
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//!
//! 本文の選び方:
//! - テキストと HTML の両方が空白でなければ `multipart/alternative`
//! - HTML だけなら `text/html` の単一パート
//! - それ以外は `text/plain` の単一パート

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        AsyncSmtpTransportBuilder,
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use mailswitch_domain::{EmailMessage, ProviderKind};
use serde::Deserialize;

use super::{EmailTransport, default_timeout_secs, timeout_from_secs};
use crate::{
    error::{InfraError, TransportError},
    registry::ProviderFactory,
    secret::SecretString,
};

/// SMTP 接続の暗号化方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// 平文（ローカルの開発用 SMTP 向け）
    None,
    /// サーバーが対応していれば STARTTLS
    #[default]
    Opportunistic,
    /// STARTTLS 必須
    Starttls,
    /// 接続時から TLS（SMTPS）
    Wrapper,
}

/// `{"id": "smtp", "host": "...", "port": 587, "user": "...", "password": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host:         String,
    pub port:         u16,
    pub user:         String,
    pub password:     SecretString,
    #[serde(default)]
    pub tls:          SmtpTls,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// SMTP トランスポート
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

fn relay_builder(config: &SmtpConfig) -> Result<AsyncSmtpTransportBuilder, InfraError> {
    let host = config.host.as_str();
    let tls_error =
        |e: lettre::transport::smtp::Error| InfraError::provider_config("smtp", e.to_string());

    let builder = match config.tls {
        // builder_dangerous: TLS なしで接続
        SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        SmtpTls::Opportunistic => {
            let parameters = TlsParameters::new(host.to_owned()).map_err(tls_error)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .tls(Tls::Opportunistic(parameters))
        }
        SmtpTls::Starttls => {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).map_err(tls_error)?
        }
        SmtpTls::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(host).map_err(tls_error)?,
    };

    Ok(builder)
}

impl ProviderFactory for SmtpTransport {
    type Config = SmtpConfig;

    const KIND: ProviderKind = ProviderKind::Smtp;

    fn from_config(config: SmtpConfig) -> Result<Self, InfraError> {
        if config.host.trim().is_empty() {
            return Err(InfraError::provider_config(Self::KIND.id(), "host が空です"));
        }
        if config.port == 0 {
            return Err(InfraError::provider_config(
                Self::KIND.id(),
                "port は 1..=65535 で指定してください",
            ));
        }

        let timeout = timeout_from_secs(Self::KIND.id(), config.timeout_secs)?;

        let credentials = Credentials::new(
            config.user.clone(),
            config.password.expose().to_owned(),
        );
        let transport = relay_builder(&config)?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport })
    }
}

fn parse_address(value: &str, role: &str) -> Result<Address, TransportError> {
    value
        .parse::<Address>()
        .map_err(|e| TransportError::Message(format!("{role}アドレス不正 ({value}): {e}")))
}

/// 送信する MIME メッセージを組み立てる
pub(crate) fn build_message(email: &EmailMessage) -> Result<Message, TransportError> {
    let from = Mailbox::new(
        Some(email.from_name().to_owned()),
        parse_address(email.from_address(), "送信元")?,
    );

    let mut builder = Message::builder().from(from).subject(email.subject());
    for to in email.to() {
        builder = builder.to(Mailbox::new(None, parse_address(to, "宛先")?));
    }

    let text = email.text_body().to_owned();
    let html = email.html_body().to_owned();
    let message = match (email.has_text(), email.has_html()) {
        (true, true) => builder.multipart(MultiPart::alternative_plain_html(text, html)),
        (false, true) => builder.singlepart(SinglePart::html(html)),
        _ => builder.singlepart(SinglePart::plain(text)),
    };

    message.map_err(|e| TransportError::Message(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        Self::KIND.id()
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        let message = build_message(email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
