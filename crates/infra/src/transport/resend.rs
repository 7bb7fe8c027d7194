//! Resend トランスポート
//!
//! `POST https://api.resend.com/emails` に Bearer トークンで JSON を送る。

use async_trait::async_trait;
use mailswitch_domain::{EmailMessage, ProviderKind};
use serde::{Deserialize, Serialize};

use super::{EmailTransport, JsonApiClient, default_timeout_secs, require_token};
use crate::{
    error::{InfraError, TransportError},
    registry::ProviderFactory,
    secret::SecretString,
};

const DEFAULT_ENDPOINT: &str = "https://api.resend.com/emails";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// `{"id": "resend", "token": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ResendConfig {
    pub token:        SecretString,
    #[serde(default = "default_endpoint")]
    pub endpoint:     String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from:    String,
    to:      &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text:    Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html:    Option<&'a str>,
}

impl<'a> From<&'a EmailMessage> for ResendPayload<'a> {
    fn from(email: &'a EmailMessage) -> Self {
        Self {
            from:    format!("{} <{}>", email.from_name(), email.from_address()),
            to:      email.to(),
            subject: email.subject(),
            text:    email.has_text().then(|| email.text_body()),
            html:    email.has_html().then(|| email.html_body()),
        }
    }
}

pub struct ResendTransport {
    client: JsonApiClient,
    token:  SecretString,
}

impl ProviderFactory for ResendTransport {
    type Config = ResendConfig;

    const KIND: ProviderKind = ProviderKind::Resend;

    fn from_config(config: ResendConfig) -> Result<Self, InfraError> {
        require_token(Self::KIND.id(), &config.token)?;
        let client = JsonApiClient::new(Self::KIND.id(), config.endpoint, config.timeout_secs)?;
        Ok(Self {
            client,
            token: config.token,
        })
    }
}

#[async_trait]
impl EmailTransport for ResendTransport {
    fn name(&self) -> &'static str {
        Self::KIND.id()
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        let authorization = format!("Bearer {}", self.token.expose());
        self.client
            .post_json(("authorization", authorization), &ResendPayload::from(email))
            .await
    }
}
