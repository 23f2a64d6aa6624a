//! # ユーザー ID
//!
//! 外部の認証プロバイダ（Spotify）が発行する安定したユーザー識別子。
//! 形式はプロバイダに依存するため、UUID ではなく空でない文字列として扱う。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// ユーザー ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// 文字列からユーザー ID を作成する
    ///
    /// 前後の空白を除いた結果が空文字列の場合はエラー。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "ユーザー ID は空にできません".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
