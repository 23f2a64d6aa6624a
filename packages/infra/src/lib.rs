//! # SongRec インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートは BFF が依存するストアのインターフェース（トレイト）と、
//! その具体的な実装を提供する。BFF はトレイトオブジェクト経由でのみ利用し、
//! Redis などの詳細には依存しない。
//!
//! ## 責務
//!
//! - **キャッシュ接続**: Redis への接続管理
//! - **認可情報ストア**: OAuth2 アクセストークンの参照（外部の認可フローが保存したもの）
//! - **セッション管理**: ログインセッションの保存・取得
//!
//! ## 依存関係
//!
//! ```text
//! bff → infra → domain
//!   ↘     ↓
//!     shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`redis`] - Redis 接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`credential_store`] - 認可情報ストア
//! - [`session`] - セッション管理
//! - `mock` - インメモリ実装（`test-utils` feature 有効時のみ）

pub mod credential_store;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod redis;
pub mod session;

pub use credential_store::{CredentialLookupError, CredentialStore, RedisCredentialStore};
pub use error::InfraError;
pub use session::{RedisSessionManager, SessionData, SessionManager};
