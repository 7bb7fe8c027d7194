//! # ProviderRegistry
//!
//! プロバイダ id からトランスポートのコンストラクタを引く表。
//! 起動時に一度だけ JSON 配列の設定を読み、設定順のトランスポート列を組み立てる。
//!
//! - 未知の id や id のないレコードは WARN ログを出してスキップする
//! - id が一致したレコードの必須フィールド欠落は [`InfraError`] で起動を止める

use std::collections::HashMap;

use mailswitch_domain::ProviderKind;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::{
    error::InfraError,
    switch::EmailSwitch,
    transport::{
        BrevoTransport,
        EmailTransport,
        ResendTransport,
        SendGridTransport,
        SmtpTransport,
        TestTransport,
    },
};

/// 設定レコードから組み立てられるトランスポート
pub trait ProviderFactory: EmailTransport + Sized + 'static {
    /// レコードから読み取る設定（`id` 以外のフィールド）
    type Config: DeserializeOwned;

    const KIND: ProviderKind;

    fn from_config(config: Self::Config) -> Result<Self, InfraError>;
}

/// レコード 1 件からトランスポートを生成する関数
pub type TransportConstructor = fn(&Value) -> Result<Box<dyn EmailTransport>, InfraError>;

fn construct<T: ProviderFactory>(record: &Value) -> Result<Box<dyn EmailTransport>, InfraError> {
    let config = T::Config::deserialize(record)
        .map_err(|e| InfraError::provider_config(T::KIND.id(), e.to_string()))?;
    Ok(Box::new(T::from_config(config)?))
}

fn constructor_for(kind: ProviderKind) -> TransportConstructor {
    match kind {
        ProviderKind::Resend => construct::<ResendTransport>,
        ProviderKind::SendGrid => construct::<SendGridTransport>,
        ProviderKind::Brevo => construct::<BrevoTransport>,
        ProviderKind::Smtp => construct::<SmtpTransport>,
        ProviderKind::Test => construct::<TestTransport>,
    }
}

/// プロバイダレジストリ
///
/// 構築後は変更しない。
pub struct ProviderRegistry {
    constructors: HashMap<&'static str, TransportConstructor>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtin_providers()
    }
}

impl ProviderRegistry {
    /// 空のレジストリを生成する
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 組み込みプロバイダ（resend / sendgrid / brevo / smtp / test）を登録済みのレジストリ
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::iter() {
            registry.register(kind.id(), constructor_for(kind));
        }
        registry
    }

    /// コンストラクタを登録する（同じ id は上書き）
    pub fn register(&mut self, id: &'static str, constructor: TransportConstructor) {
        self.constructors.insert(id, constructor);
    }

    /// 登録済み id の一覧（ソート済み）
    pub fn registered_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.constructors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 設定ドキュメントからトランスポート列を組み立てる
    ///
    /// 出力の順序は入力レコードの順序と同じで、これがフェイルオーバーの優先順になる。
    pub fn build(&self, document: &Value) -> Result<Vec<Box<dyn EmailTransport>>, InfraError> {
        let records = document.as_array().ok_or_else(|| {
            InfraError::provider_document("プロバイダ設定は JSON 配列である必要があります")
        })?;

        let mut transports = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let Some(id) = record.get("id").and_then(Value::as_str) else {
                tracing::warn!(index, "id のないプロバイダ設定をスキップ");
                continue;
            };
            let Some(constructor) = self.constructors.get(id) else {
                tracing::warn!(index, provider = id, "未知のプロバイダをスキップ");
                continue;
            };

            let transport = constructor(record)?;
            tracing::info!(index, provider = transport.name(), "トランスポートを登録");
            transports.push(transport);
        }

        Ok(transports)
    }

    /// JSON 文字列の設定ドキュメントからトランスポート列を組み立てる
    pub fn build_from_str(
        &self,
        document: &str,
    ) -> Result<Vec<Box<dyn EmailTransport>>, InfraError> {
        let document: Value = serde_json::from_str(document)
            .map_err(|e| InfraError::provider_document(format!("JSON として解析できません: {e}")))?;
        self.build(&document)
    }

    /// 設定ドキュメントから [`EmailSwitch`] を組み立てる
    pub fn build_switch(&self, document: &Value) -> Result<EmailSwitch, InfraError> {
        Ok(EmailSwitch::new(self.build(document)?))
    }
}
