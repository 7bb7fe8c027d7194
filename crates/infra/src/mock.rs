//! # テスト用モックトランスポート
//!
//! 結果を固定したトランスポートと呼び出し回数カウンタ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailswitch-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use mailswitch_domain::EmailMessage;

use crate::{error::TransportError, transport::EmailTransport};

/// 結果を固定したトランスポート
///
/// clone したインスタンス同士はカウンタと受信履歴を共有する。
#[derive(Clone)]
pub struct MockEmailTransport {
    name:     &'static str,
    succeeds: bool,
    calls:    Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailTransport {
    fn new(succeeds: bool) -> Self {
        Self {
            name: "mock",
            succeeds,
            calls: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 常に成功する
    pub fn succeeding() -> Self {
        Self::new(true)
    }

    /// 常に失敗する
    pub fn failing() -> Self {
        Self::new(false)
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 受け取ったメッセージ（呼び出し順）
    pub fn received(&self) -> Vec<EmailMessage> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for MockEmailTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, email: &EmailMessage) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(email.clone());

        if self.succeeds {
            Ok(())
        } else {
            Err(TransportError::Status {
                status: 503,
                body:   "mock failure".to_string(),
            })
        }
    }
}
