//! # MailSwitch ドメイン層
//!
//! メール送信リクエストと、その検証ルールを定義する。
//!
//! ## 設計方針
//!
//! - **受信 DTO と検証済みメッセージの分離**: [`EmailRequest`] は HTTP ボディを
//!   そのままデシリアライズした値、[`EmailMessage`] は検証を通過した不変の値
//! - **純粋関数**: 検証はネットワークや I/O に一切依存しない
//! - **プロバイダ種別の列挙**: 設定ファイルの `id` 文字列と 1 対 1 に対応する
//!   [`ProviderKind`] を提供する
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`email`] - メール送信リクエストと検証
//! - [`provider`] - 送信プロバイダ種別
//!
//! ## 使用例
//!
//! ```rust
//! use mailswitch_domain::EmailRequest;
//!
//! let request = EmailRequest {
//!     from_email: "noreply@example.com".to_string(),
//!     from_name:  None,
//!     to:         vec!["user@example.com".to_string()],
//!     subject:    "Welcome".to_string(),
//!     text:       "Hello".to_string(),
//!     html:       String::new(),
//! };
//!
//! let message = request.into_message().unwrap();
//! assert_eq!(message.from_name(), "noreply@example.com");
//! ```

pub mod email;
pub mod provider;

pub use email::{EmailMessage, EmailRequest, EmailValidationError};
pub use provider::ProviderKind;
