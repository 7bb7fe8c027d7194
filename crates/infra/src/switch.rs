//! # EmailSwitch
//!
//! 設定順のトランスポート列を保持し、先頭から順に 1 つずつ試すフェイルオーバー配信。
//!
//! - 最初に成功したトランスポートで止まり、残りは呼び出さない（二重送信しない）
//! - トランスポートを並行に呼び出すことはない
//! - リトライ・バックオフ・待機はしない
//!
//! 構築後のトランスポート列は不変のため、`Arc` で共有して複数リクエストから
//! 同時に呼び出してよい。

use mailswitch_domain::EmailMessage;

use crate::transport::EmailTransport;

/// フェイルオーバー配信
pub struct EmailSwitch {
    transports: Vec<Box<dyn EmailTransport>>,
}

impl EmailSwitch {
    pub fn new(transports: Vec<Box<dyn EmailTransport>>) -> Self {
        Self { transports }
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// 優先順のトランスポート名
    pub fn transport_names(&self) -> Vec<&'static str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// メールを配信する
    ///
    /// いずれかのトランスポートが成功すれば `true`。全て失敗した場合、
    /// またはトランスポートが 1 つもない場合は `false`。
    pub async fn send(&self, email: &EmailMessage) -> bool {
        for (attempt, transport) in self.transports.iter().enumerate() {
            if transport.send(email).await {
                tracing::info!(
                    transport = transport.name(),
                    attempt = attempt + 1,
                    recipients = email.to().len(),
                    "メールを送信しました"
                );
                return true;
            }
        }

        tracing::error!(
            attempts = self.transports.len(),
            "全てのトランスポートで送信に失敗"
        );
        false
    }
}

impl std::fmt::Debug for EmailSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSwitch")
            .field("transports", &self.transport_names())
            .finish()
    }
}
