//! # MailSwitch API サーバー
//!
//! メール送信リクエストを受け付け、設定順のプロバイダにフェイルオーバーしながら配信する。
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 認証 |
//! |---------|------|------|
//! | `POST` | `/api/emails` | `Authorization: <scheme> <ROOT_API_KEY>` |
//! | `POST` | `/api/qstash` | `Upstash-Signature`（`QSTASH` 有効時のみ） |
//! | `GET` | `/health` | なし |
//! | `GET` | `/health/ready` | なし |
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State とルーターの構築
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - API エラーと HTTP レスポンスへの変換
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`middleware`] - API キー認証

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;

pub use app_builder::{AppState, build_app};
pub use config::ApiConfig;
pub use error::ApiError;
