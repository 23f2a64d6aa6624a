//! # アクセス認可情報
//!
//! OAuth2 認可コードフローで取得したアクセストークンを表現する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ProviderName`] | プロバイダ名 | 認可を発行した外部サービス（例: `spotify`） |
//! | [`AccessToken`] | アクセストークン | 下流 API 呼び出しに Bearer として付与する不透明な文字列 |
//! | [`AccessCredential`] | アクセス認可情報 | (プロバイダ名, ユーザー ID) に紐づくトークンと有効期限 |
//!
//! ## 秘匿性
//!
//! `AccessToken` は `secrecy::SecretString` をラップしており、`Debug` 出力では
//! 値が伏せられる。生の値が必要なのは `Authorization` ヘッダーを組み立てる箇所と
//! 永続化する箇所のみで、どちらも [`AccessToken::expose_secret`] を明示的に呼ぶ。

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{DomainError, user::UserId};

/// Spotify のプロバイダ名
const SPOTIFY: &str = "spotify";

/// マスク表示で残す先頭文字数
const MASK_VISIBLE_CHARS: usize = 4;

/// プロバイダ名
///
/// 認可情報の検索キーの一部。大文字小文字は区別せず、小文字に正規化する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_ascii_lowercase();
        if value.is_empty() {
            return Err(DomainError::Validation(
                "プロバイダ名は空にできません".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Spotify プロバイダ
    pub fn spotify() -> Self {
        Self(SPOTIFY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(name: ProviderName) -> Self {
        name.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// アクセストークン
#[derive(Debug)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// 生のトークン値を取得する
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// 先頭数文字のみを残したマスク表示を返す
    ///
    /// ```
    /// use songrec_domain::credential::AccessToken;
    ///
    /// assert_eq!(AccessToken::new("BQDx1234abcd").masked(), "BQDx****");
    /// assert_eq!(AccessToken::new("ab").masked(), "ab****");
    /// ```
    pub fn masked(&self) -> String {
        let visible: String = self
            .expose_secret()
            .chars()
            .take(MASK_VISIBLE_CHARS)
            .collect();
        format!("{visible}****")
    }
}

impl Clone for AccessToken {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

/// アクセス認可情報
///
/// 外部の認可フローで作成され、フォワーダからは読み取り専用で参照される。
/// 有効期限の解釈は認可情報ストアの責務。
#[derive(Debug, Clone)]
pub struct AccessCredential {
    provider:   ProviderName,
    user_id:    UserId,
    token:      AccessToken,
    issued_at:  DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessCredential {
    pub fn new(
        provider: ProviderName,
        user_id: UserId,
        token: AccessToken,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            provider,
            user_id,
            token,
            issued_at,
            expires_at,
        }
    }

    pub fn provider(&self) -> &ProviderName {
        &self.provider
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// 指定時刻の時点で期限切れかどうか
    ///
    /// 有効期限が設定されていない場合は常に `false`。
    /// 有効期限ちょうどの時刻は期限切れとみなす。
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}
