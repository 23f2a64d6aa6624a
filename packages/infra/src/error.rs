//! # インフラ層エラー定義
//!
//! Redis との通信や保存データの変換で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `redis::RedisError`, `serde_json::Error` を `#[from]` でラップ
//! - **ドメインエラーとの分離**: インフラ固有のエラーを明示
//! - **ログ可能性**: `Display` に原因を含め、BFF 側でそのままログ出力できる

use thiserror::Error;

/// インフラ層で発生するエラー
#[derive(Debug, Error)]
pub enum InfraError {
    /// Redis エラー
    ///
    /// Redis への接続失敗、コマンド実行エラーなど。
    #[error("Redis エラー: {0}")]
    Redis(#[from] redis::RedisError),

    /// シリアライズ/デシリアライズエラー
    #[error("シリアライズエラー: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 保存データがドメインの制約を満たさない
    #[error("保存データが不正です: {0}")]
    InvalidData(String),
}

impl From<songrec_domain::DomainError> for InfraError {
    fn from(err: songrec_domain::DomainError) -> Self {
        InfraError::InvalidData(err.to_string())
    }
}
