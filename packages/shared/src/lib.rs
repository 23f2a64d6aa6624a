//! # SongRec 共有ユーティリティ
//!
//! このクレートは、SongRec プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, bff）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（トレーシング関連は `observability` feature）

pub mod error_response;
pub mod health;
#[cfg(feature = "observability")]
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
