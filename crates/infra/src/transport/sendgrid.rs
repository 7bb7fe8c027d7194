//! SendGrid トランスポート
//!
//! `POST https://api.sendgrid.com/v3/mail/send` に Bearer トークンで JSON を送る。
//! SendGrid は空の content を拒否するため、空の本文パートは送らない。

use async_trait::async_trait;
use mailswitch_domain::{EmailMessage, ProviderKind};
use serde::{Deserialize, Serialize};

use super::{EmailTransport, JsonApiClient, default_timeout_secs, require_token};
use crate::{
    error::{InfraError, TransportError},
    registry::ProviderFactory,
    secret::SecretString,
};

const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// `{"id": "sendgrid", "token": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridConfig {
    pub token:        SecretString,
    #[serde(default = "default_endpoint")]
    pub endpoint:     String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct SendGridPayload<'a> {
    personalizations: [Personalization<'a>; 1],
    from:             Address<'a>,
    reply_to:         Address<'a>,
    subject:          &'a str,
    content:          Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Recipient<'a>>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name:  &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value:        &'a str,
}

impl<'a> Address<'a> {
    fn sender(email: &'a EmailMessage) -> Self {
        Self {
            email: email.from_address(),
            name:  email.from_name(),
        }
    }
}

impl<'a> From<&'a EmailMessage> for SendGridPayload<'a> {
    fn from(email: &'a EmailMessage) -> Self {
        // text/plain を先に置く（SendGrid の順序制約）
        let mut content = Vec::with_capacity(2);
        if email.has_text() {
            content.push(Content {
                content_type: "text/plain",
                value:        email.text_body(),
            });
        }
        if email.has_html() {
            content.push(Content {
                content_type: "text/html",
                value:        email.html_body(),
            });
        }

        Self {
            personalizations: [Personalization {
                to: email
                    .to()
                    .iter()
                    .map(|address| Recipient { email: address })
                    .collect(),
            }],
            from: Address::sender(email),
            reply_to: Address::sender(email),
            subject: email.subject(),
            content,
        }
    }
}

pub struct SendGridTransport {
    client: JsonApiClient,
    token:  SecretString,
}

impl ProviderFactory for SendGridTransport {
    type Config = SendGridConfig;

    const KIND: ProviderKind = ProviderKind::SendGrid;

    fn from_config(config: SendGridConfig) -> Result<Self, InfraError> {
        require_token(Self::KIND.id(), &config.token)?;
        let client = JsonApiClient::new(Self::KIND.id(), config.endpoint, config.timeout_secs)?;
        Ok(Self {
            client,
            token: config.token,
        })
    }
}

#[async_trait]
impl EmailTransport for SendGridTransport {
    fn name(&self) -> &'static str {
        Self::KIND.id()
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        let authorization = format!("Bearer {}", self.token.expose());
        self.client
            .post_json(
                ("authorization", authorization),
                &SendGridPayload::from(email),
            )
            .await
    }
}
