//! # Redis 接続管理
//!
//! セッションと認可情報を保存する Redis への接続管理を行う。
//!
//! ## Redis の用途
//!
//! | キー | 値 | 書き込み元 |
//! |-----|-----|-----------|
//! | `session:{session_id}` | [`SessionData`](crate::SessionData)（JSON） | 認証レイヤー |
//! | `oauth2:authorized_client:{provider}:{user_id}` | 認可情報（JSON） | 外部の認可フロー |
//!
//! ## ConnectionManager
//!
//! `ConnectionManager` は接続が切断された場合に自動で再接続を試みる。
//! Clone は安価で、操作ごとに clone して使う。

use redis::{Client, aio::ConnectionManager};

/// Redis 接続マネージャを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したマネージャを
/// 各ストアで共有する。
///
/// # 引数
///
/// * `redis_url` - Redis 接続 URL
///   - 形式: `redis://[[username:]password@]host[:port][/database]`
///   - TLS: `rediss://` スキームで TLS 接続
///
/// # エラー
///
/// - URL パースエラー: 不正な URL 形式
/// - 接続エラー: Redis サーバーに接続できない
pub async fn create_connection_manager(
    redis_url: &str,
) -> Result<ConnectionManager, redis::RedisError> {
    let client = Client::open(redis_url)?;
    ConnectionManager::new(client).await
}
