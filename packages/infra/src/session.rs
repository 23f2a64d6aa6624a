//! # セッション管理
//!
//! Redis を使用したログインセッション管理を提供する。
//! 認証ミドルウェアはセッションから [`AuthenticatedIdentity`] を組み立てる。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | 28800秒（8時間） |

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use songrec_domain::{identity::AuthenticatedIdentity, user::UserId};
use uuid::Uuid;

use crate::InfraError;

/// セッションの有効期限（秒）
/// 8時間 = 28800秒
const SESSION_TTL_SECONDS: u64 = 28800;

/// セッションデータ
///
/// Redis に JSON 形式で保存されるセッション情報。
/// 認可フロー完了時に作成され、ログアウトまたは TTL 経過で削除される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    user_id:    UserId,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
}

impl SessionData {
    /// 新しいセッションデータを作成する
    ///
    /// `created_at` は現在時刻で初期化される。
    pub fn new(user_id: UserId, attributes: BTreeMap<String, String>) -> Self {
        Self {
            user_id,
            attributes,
            created_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// リクエスト単位の認証済みアイデンティティに変換する
    pub fn to_identity(&self) -> AuthenticatedIdentity {
        AuthenticatedIdentity::with_attributes(self.user_id.clone(), self.attributes.clone())
    }
}

/// セッション管理トレイト
///
/// 実装は Redis を使用する `RedisSessionManager` を参照。
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// セッションを作成し、セッション ID（UUID v4）を返す
    ///
    /// 外部の認可フローがログイン完了時に呼び出す。BFF 自身は使わない。
    async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

    /// 指定したセッション ID でセッションを作成する（開発用シードで使用）
    async fn create_with_id(&self, session_id: &str, data: &SessionData)
    -> Result<(), InfraError>;

    /// セッションを取得する
    ///
    /// セッションが存在すれば `Some(SessionData)`、なければ `None`
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

    /// セッションを削除する
    ///
    /// 存在しないセッションを削除しても成功とする。
    async fn delete(&self, session_id: &str) -> Result<(), InfraError>;
}

/// Redis を使用したセッションマネージャ
#[derive(Clone)]
pub struct RedisSessionManager {
    conn: ConnectionManager,
}

impl RedisSessionManager {
    /// 新しい RedisSessionManager を作成する
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let conn = crate::redis::create_connection_manager(redis_url).await?;
        Ok(Self { conn })
    }

    /// 既存の接続マネージャから作成する
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        // UUID v4 でセッション ID を生成（暗号論的に安全なランダム値）
        let session_id = Uuid::new_v4().to_string();
        self.create_with_id(&session_id, data).await?;
        Ok(session_id)
    }

    async fn create_with_id(
        &self,
        session_id: &str,
        data: &SessionData,
    ) -> Result<(), InfraError> {
        let key = Self::session_key(session_id);
        let json = serde_json::to_string(data)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, SESSION_TTL_SECONDS).await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(&key).await?;

        match result {
            Some(json) => {
                let data: SessionData = serde_json::from_str(&json)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();
        let _: () = conn.del(&key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_セッションキーの形式() {
        assert_eq!(RedisSessionManager::session_key("abc"), "session:abc");
    }

    #[test]
    fn test_アイデンティティに属性が引き継がれる() {
        let data = SessionData::new(
            UserId::new("user-1").unwrap(),
            BTreeMap::from([("id".to_string(), "user-1".to_string())]),
        );

        let identity = data.to_identity();

        assert_eq!(identity.user_id().as_str(), "user-1");
        assert_eq!(identity.attribute("id"), Some("user-1"));
    }

    #[test]
    fn test_属性なしのjsonも読み込める() {
        let json = r#"{"user_id": "user-1", "created_at": "2026-01-01T00:00:00Z"}"#;
        let data: SessionData = serde_json::from_str(json).unwrap();

        assert!(data.attributes().is_empty());
    }
}
