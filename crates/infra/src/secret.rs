//! # 秘匿文字列
//!
//! API トークンや SMTP パスワード、署名鍵を保持する。
//! `Debug` 出力では値を伏せるため、設定構造体をそのままログに出しても漏れない。

use std::fmt;

use serde::Deserialize;

/// ログに出してはいけない文字列
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 生の値を取り出す
    ///
    /// 認証ヘッダーの組み立てと鍵の比較以外では使わないこと。
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
