//! # HTTP リクエストハンドラ
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置し、親モジュールで re-export する
//! - ハンドラは薄く保ち、認可情報の扱いは [`CredentialedForwarder`](crate::forwarder::CredentialedForwarder) に委譲
//!
//! ## ハンドラ一覧
//!
//! | ルート | ハンドラ | 認証 |
//! |-------|---------|------|
//! | `GET /` | `home` | 不要 |
//! | `GET /health` | `health_check` | 不要 |
//! | `GET /secured` | `secured` | 必要 |
//! | `GET /recommend` | `recommend` | 必要 |

pub mod health;
pub mod home;
pub mod recommend;
pub mod secured;

pub use health::health_check;
pub use home::home;
pub use recommend::recommend;
pub use secured::secured;
