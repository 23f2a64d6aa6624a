//! # SongRec BFF ライブラリ
//!
//! Spotify の認可情報を使ってレコメンドサービスを呼び出す BFF のコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーター構築
//! - `client`: レコメンドサービスクライアント
//! - `config`: 環境変数からの設定読み込み
//! - `dev_auth`: 開発用認証バイパス（`dev-auth` feature 有効時のみ）
//! - `error`: エラーから HTTP レスポンスへの変換
//! - `forwarder`: 認可情報付きフォワーダ
//! - `handler`: HTTP ハンドラ
//! - `middleware`: 認証・Request ID 伝播

pub mod app_builder;
pub mod client;
pub mod config;
#[cfg(feature = "dev-auth")]
pub mod dev_auth;
pub mod error;
pub mod forwarder;
pub mod handler;
pub mod middleware;
