//! # ミドルウェア
//!
//! - [`api_key`] - `Authorization` ヘッダーによる API キー認証

pub mod api_key;

pub use api_key::{ApiKeyState, require_api_key};
