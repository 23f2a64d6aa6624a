//! # SongRec ドメイン層
//!
//! 認証済みアイデンティティとアクセス認可情報（OAuth2 アクセストークン）を表現する
//! 値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: `UserId` や `ProviderName` を文字列と区別し、取り違えを防ぐ
//! - **不変性**: すべての値は生成後に変更されない
//! - **秘匿性**: アクセストークンは `secrecy` でラップし、`Debug` やログに露出させない
//!
//! ## モジュール構成
//!
//! - [`user`] - ユーザー ID
//! - [`identity`] - 認証済みアイデンティティ
//! - [`credential`] - プロバイダ名、アクセストークン、アクセス認可情報
//! - [`error`] - ドメインエラー

pub mod credential;
pub mod error;
pub mod identity;
pub mod user;

pub use error::DomainError;
