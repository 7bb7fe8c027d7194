//! # 送信プロバイダ種別
//!
//! プロバイダ設定レコードの `id` と 1 対 1 に対応する列挙型。
//! 組み込みプロバイダの一覧は [`ProviderKind::iter`](strum::IntoEnumIterator::iter) で得る。

use strum::{EnumIter, IntoStaticStr};

/// 送信プロバイダ種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// Resend（HTTP JSON API、Bearer トークン）
    Resend,
    /// SendGrid（HTTP JSON API、Bearer トークン）
    #[strum(serialize = "sendgrid")]
    SendGrid,
    /// Brevo（HTTP JSON API、`api-key` ヘッダー）
    Brevo,
    /// SMTP（ユーザー名・パスワード認証）
    Smtp,
    /// テスト用（ログ出力のみ、常に成功）
    Test,
}

impl ProviderKind {
    /// 設定レコードの `id` として使う文字列
    pub fn id(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(ProviderKind::Resend, "resend")]
    #[case(ProviderKind::SendGrid, "sendgrid")]
    #[case(ProviderKind::Brevo, "brevo")]
    #[case(ProviderKind::Smtp, "smtp")]
    #[case(ProviderKind::Test, "test")]
    fn test_idは設定レコードの小文字表記(#[case] kind: ProviderKind, #[case] expected: &str) {
        assert_eq!(kind.id(), expected);
    }

    #[test]
    fn test_displayはidと一致する() {
        for kind in ProviderKind::iter() {
            assert_eq!(kind.to_string(), kind.id());
        }
    }

    #[test]
    fn test_組み込みプロバイダは5種類() {
        assert_eq!(ProviderKind::iter().count(), 5);
    }
}
