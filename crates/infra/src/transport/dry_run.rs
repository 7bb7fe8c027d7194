//! テスト用トランスポート
//!
//! メールを外部に送らず、エンベロープを INFO ログに出して常に成功する。
//! `{"id": "test"}` で有効化する。

use async_trait::async_trait;
use mailswitch_domain::{EmailMessage, ProviderKind};
use serde::Deserialize;

use super::EmailTransport;
use crate::{
    error::{InfraError, TransportError},
    registry::ProviderFactory,
};

/// 追加フィールドなし
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestConfig {}

#[derive(Debug, Clone, Default)]
pub struct TestTransport;

impl ProviderFactory for TestTransport {
    type Config = TestConfig;

    const KIND: ProviderKind = ProviderKind::Test;

    fn from_config(_config: TestConfig) -> Result<Self, InfraError> {
        Ok(Self)
    }
}

#[async_trait]
impl EmailTransport for TestTransport {
    fn name(&self) -> &'static str {
        Self::KIND.id()
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        tracing::info!(
            from = %email.from_address(),
            from_name = %email.from_name(),
            to = ?email.to(),
            subject = %email.subject(),
            "test: メール送信をスキップ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mailswitch_domain::EmailRequest;

    use super::*;

    #[tokio::test]
    async fn test_sendは常に成功する() {
        let email = EmailRequest {
            from_email: "noreply@example.com".to_string(),
            from_name:  None,
            to:         vec!["user@example.com".to_string()],
            subject:    "件名".to_string(),
            text:       "本文".to_string(),
            html:       String::new(),
        }
        .into_message()
        .unwrap();

        assert!(TestTransport.send(&email).await);
    }
}
