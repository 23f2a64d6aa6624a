//! # ミドルウェア
//!
//! BFF 用のミドルウェアを提供する。
//!
//! - `authn`: セッション Cookie から認証済みアイデンティティを解決する
//! - `request_id`: Request ID を下流サービス呼び出しへ伝播する

mod authn;
pub mod request_id;

pub use authn::{AuthnState, SESSION_COOKIE_NAME, require_identity};
