//! # アプリケーション設定
//!
//! 環境変数から起動時に一度だけ設定を読み込む。
//!
//! ## 環境変数一覧
//!
//! | 変数名 | 必須 | デフォルト | 説明 |
//! |--------|------|------------|------|
//! | `API_HOST` | No | `0.0.0.0` | バインドアドレス |
//! | `API_PORT` | No | `8080` | ポート番号 |
//! | `ROOT_API_KEY` | **Yes** | - | `/api/emails` の認証トークン |
//! | `PROVIDERS_VALUE` | No | - | プロバイダ設定の JSON 配列（`PROVIDERS_FILE` より優先） |
//! | `PROVIDERS_FILE` | No | `./providers.json` | プロバイダ設定ファイルのパス |
//! | `QSTASH` | No | `false` | `true` / `1` で `/api/qstash` を有効化 |
//! | `QSTASH_CURRENT_SIGNING_KEY` | `QSTASH` 有効時 | - | current 署名鍵 |
//! | `QSTASH_NEXT_SIGNING_KEY` | `QSTASH` 有効時 | - | next 署名鍵 |
//! | `QSTASH_URL` | No | - | 設定時は `sub` クレームがこの URL と一致すること |

use std::{env, path::PathBuf};

use mailswitch_infra::{SecretString, SignatureVerifier};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROVIDERS_FILE: &str = "./providers.json";

/// 起動時の設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("環境変数 {0} が設定されていません")]
    Missing(&'static str),

    #[error("環境変数 {name} の値が不正です: {message}")]
    Invalid {
        name:    &'static str,
        message: String,
    },

    #[error("プロバイダ設定ファイル {path} を読み込めません: {source}")]
    ProvidersFile {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// プロバイダ設定の取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvidersSource {
    /// `PROVIDERS_VALUE` に直接書かれた JSON
    Inline(String),
    /// `PROVIDERS_FILE` のパス
    File(PathBuf),
}

impl ProvidersSource {
    /// JSON 文字列を読み込む
    pub fn load(&self) -> Result<String, ConfigError> {
        match self {
            Self::Inline(value) => Ok(value.clone()),
            Self::File(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::ProvidersFile {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// QStash Webhook の設定
#[derive(Debug, Clone)]
pub struct QStashConfig {
    pub current_signing_key: SecretString,
    pub next_signing_key:    SecretString,
    /// `sub` クレームと照合する配信先 URL
    pub url:                 Option<String>,
}

impl QStashConfig {
    pub fn verifier(&self) -> SignatureVerifier {
        let verifier = SignatureVerifier::new(
            self.current_signing_key.clone(),
            self.next_signing_key.clone(),
        );
        match &self.url {
            Some(url) => verifier.with_expected_url(url.clone()),
            None => verifier,
        }
    }
}

/// API サーバーの設定
///
/// 起動時に一度だけ構築し、ルーター構築に渡す。
/// 秘匿値は [`SecretString`] で保持するため、`Debug` 出力しても漏れない。
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host:         String,
    pub port:         u16,
    pub root_api_key: SecretString,
    pub providers:    ProvidersSource,
    /// `None` なら `/api/qstash` を公開しない
    pub qstash:       Option<QStashConfig>,
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の変数取得関数から設定を読み込む
    ///
    /// 空白のみの値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = get("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("API_PORT") {
            Some(value) => value.trim().parse().map_err(|e| ConfigError::Invalid {
                name:    "API_PORT",
                message: format!("{value:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let root_api_key = get("ROOT_API_KEY")
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("ROOT_API_KEY"))?;

        let providers = match get("PROVIDERS_VALUE") {
            Some(value) => ProvidersSource::Inline(value),
            None => ProvidersSource::File(PathBuf::from(
                get("PROVIDERS_FILE").unwrap_or_else(|| DEFAULT_PROVIDERS_FILE.to_string()),
            )),
        };

        let qstash_enabled = get("QSTASH").is_some_and(|value| is_enabled(&value));
        let qstash = if qstash_enabled {
            Some(QStashConfig {
                current_signing_key: get("QSTASH_CURRENT_SIGNING_KEY")
                    .map(SecretString::from)
                    .ok_or(ConfigError::Missing("QSTASH_CURRENT_SIGNING_KEY"))?,
                next_signing_key:    get("QSTASH_NEXT_SIGNING_KEY")
                    .map(SecretString::from)
                    .ok_or(ConfigError::Missing("QSTASH_NEXT_SIGNING_KEY"))?,
                url:                 get("QSTASH_URL"),
            })
        } else {
            None
        };

        Ok(Self {
            host,
            port,
            root_api_key,
            providers,
            qstash,
        })
    }
}

/// `true` / `1`（大文字小文字を区別しない）
fn is_enabled(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}
