//! Brevo トランスポート
//!
//! `POST https://api.brevo.com/v3/smtp/email` に `api-key` ヘッダーで JSON を送る。

use async_trait::async_trait;
use mailswitch_domain::{EmailMessage, ProviderKind};
use serde::{Deserialize, Serialize};

use super::{EmailTransport, JsonApiClient, default_timeout_secs, require_token};
use crate::{
    error::{InfraError, TransportError},
    registry::ProviderFactory,
    secret::SecretString,
};

const DEFAULT_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// `{"id": "brevo", "token": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct BrevoConfig {
    pub token:        SecretString,
    #[serde(default = "default_endpoint")]
    pub endpoint:     String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender:       Sender<'a>,
    to:           Vec<Recipient<'a>>,
    subject:      &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Sender<'a> {
    name:  &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

impl<'a> From<&'a EmailMessage> for BrevoPayload<'a> {
    fn from(email: &'a EmailMessage) -> Self {
        Self {
            sender:       Sender {
                name:  email.from_name(),
                email: email.from_address(),
            },
            to:           email
                .to()
                .iter()
                .map(|address| Recipient { email: address })
                .collect(),
            subject:      email.subject(),
            html_content: email.has_html().then(|| email.html_body()),
            text_content: email.has_text().then(|| email.text_body()),
        }
    }
}

pub struct BrevoTransport {
    client:  JsonApiClient,
    api_key: SecretString,
}

impl ProviderFactory for BrevoTransport {
    type Config = BrevoConfig;

    const KIND: ProviderKind = ProviderKind::Brevo;

    fn from_config(config: BrevoConfig) -> Result<Self, InfraError> {
        require_token(Self::KIND.id(), &config.token)?;
        let client = JsonApiClient::new(Self::KIND.id(), config.endpoint, config.timeout_secs)?;
        Ok(Self {
            client,
            api_key: config.token,
        })
    }
}

#[async_trait]
impl EmailTransport for BrevoTransport {
    fn name(&self) -> &'static str {
        Self::KIND.id()
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        self.client
            .post_json(
                ("api-key", self.api_key.expose().to_owned()),
                &BrevoPayload::from(email),
            )
            .await
    }
}
