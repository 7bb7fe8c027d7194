//! # メール送信リクエスト
//!
//! `POST /api/emails` と `POST /api/qstash` が受け付けるボディと、その検証ルール。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`EmailRequest`] | 送信リクエスト | HTTP ボディをデシリアライズした未検証の値 |
//! | [`EmailMessage`] | 送信メッセージ | 検証済み・不変。Transport に渡される |
//! | [`EmailValidationError`] | 検証エラー | 400 レスポンスの detail になる |
//!
//! ## 検証ルール
//!
//! 1. 送信元アドレスが空白でなく、`@` をちょうど 1 つ含み、先頭・末尾が `@` でない
//! 2. 宛先が 1 件以上ある
//! 3. 件名が空白でない
//! 4. テキスト本文と HTML 本文の少なくとも一方が空白でない

use serde::Deserialize;
use thiserror::Error;

/// 送信リクエストの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailValidationError {
    /// 送信元アドレスが空、または形式が不正
    #[error("送信元メールアドレスの形式が不正です")]
    InvalidFromAddress,

    /// 宛先が空
    #[error("宛先が指定されていません")]
    NoRecipients,

    /// 件名が空
    #[error("件名は必須です")]
    MissingSubject,

    /// 本文（テキスト・HTML）がどちらも空
    #[error("テキスト本文または HTML 本文のいずれかが必要です")]
    MissingBody,
}

/// メール送信リクエスト（受信 DTO）
///
/// JSON のフィールド名は camelCase（`fromEmail`, `fromName`, `to`, `subject`,
/// `text`, `html`）。欠落したフィールドは空値として扱い、形状の判定は
/// [`validate`](Self::validate) に任せる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailRequest {
    /// 送信元メールアドレス
    pub from_email: String,
    /// 送信者の表示名（省略時は送信元アドレスを使う）
    pub from_name:  Option<String>,
    /// 宛先メールアドレス（順序を保持）
    pub to:         Vec<String>,
    /// 件名
    pub subject:    String,
    /// プレーンテキスト本文
    pub text:       String,
    /// HTML 本文
    pub html:       String,
}

impl EmailRequest {
    /// 検証ルールをすべて満たすか
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// 検証ルールを順に適用し、最初に違反したルールを返す
    pub fn validate(&self) -> Result<(), EmailValidationError> {
        if is_blank(&self.from_email) || !is_email_address(&self.from_email) {
            return Err(EmailValidationError::InvalidFromAddress);
        }
        if self.to.is_empty() {
            return Err(EmailValidationError::NoRecipients);
        }
        if is_blank(&self.subject) {
            return Err(EmailValidationError::MissingSubject);
        }
        if is_blank(&self.text) && is_blank(&self.html) {
            return Err(EmailValidationError::MissingBody);
        }
        Ok(())
    }

    /// 検証を行い、送信可能な [`EmailMessage`] に変換する
    ///
    /// 表示名が未指定または空白の場合は送信元アドレスで補う。
    pub fn into_message(self) -> Result<EmailMessage, EmailValidationError> {
        self.validate()?;

        let from_name = match self.from_name {
            Some(name) if !is_blank(&name) => name,
            _ => self.from_email.clone(),
        };

        Ok(EmailMessage {
            from_address: self.from_email,
            from_name,
            to: self.to,
            subject: self.subject,
            text_body: self.text,
            html_body: self.html,
        })
    }
}

/// 検証済みの送信メッセージ
///
/// [`EmailRequest::into_message`] でのみ生成できる。生成後は変更できない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    from_address: String,
    from_name:    String,
    to:           Vec<String>,
    subject:      String,
    text_body:    String,
    html_body:    String,
}

impl EmailMessage {
    pub fn from_address(&self) -> &str {
        &self.from_address
    }

    pub fn from_name(&self) -> &str {
        &self.from_name
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// テキスト本文が空白でないか
    pub fn has_text(&self) -> bool {
        !is_blank(&self.text_body)
    }

    /// HTML 本文が空白でないか
    pub fn has_html(&self) -> bool {
        !is_blank(&self.html_body)
    }
}

impl TryFrom<EmailRequest> for EmailMessage {
    type Error = EmailValidationError;

    fn try_from(request: EmailRequest) -> Result<Self, Self::Error> {
        request.into_message()
    }
}

/// 最小限のメールアドレス形状チェック
///
/// `@` がちょうど 1 つあり、それが先頭でも末尾でもないこと。
pub fn is_email_address(value: &str) -> bool {
    let Some(index) = value.find('@') else {
        return false;
    };

    index > 0 && index != value.len() - 1 && value.rfind('@') == Some(index)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
