//! # MailSwitch インフラ層
//!
//! 外部のメール配信サービスとの通信と、Webhook 署名の検証を担当する。
//!
//! ## 責務
//!
//! - **トランスポート**: Resend / SendGrid / Brevo の HTTP API と SMTP による 1 通の配信
//! - **プロバイダレジストリ**: JSON 設定からトランスポート列を組み立てる
//! - **フェイルオーバー**: [`EmailSwitch`] が設定順にトランスポートを試し、最初の成功で止まる
//! - **署名検証**: QStash の `Upstash-Signature` トークンを current / next の 2 鍵で検証する
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use mailswitch_infra::ProviderRegistry;
//!
//! let document = serde_json::json!([{ "id": "test" }]);
//! let switch = ProviderRegistry::with_builtin_providers().build_switch(&document)?;
//! let delivered = switch.send(&message).await;
//! ```

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod registry;
pub mod secret;
pub mod signature;
pub mod switch;
pub mod transport;

pub use error::{InfraError, InfraErrorKind, SignatureError, TransportError};
pub use registry::ProviderRegistry;
pub use secret::SecretString;
pub use signature::{SignatureVerifier, VerificationResult, verify_signature};
pub use switch::EmailSwitch;
pub use transport::EmailTransport;
