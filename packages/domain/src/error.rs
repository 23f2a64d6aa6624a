//! # ドメインエラー

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 値オブジェクトの検証エラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
