//! # 認可情報ストア
//!
//! 外部の OAuth2 認可フローが保存したアクセス認可情報を、
//! (プロバイダ名, ユーザー ID) をキーに参照する。
//!
//! ## 責務の境界
//!
//! - [`CredentialStore`] が公開する操作は `lookup` のみ。フォワーダは参照しかしない
//! - 有効期限の判定はストアが行い、期限切れは [`CredentialLookupError::Expired`] で返す
//! - 保存・削除は [`RedisCredentialStore`] の固有メソッドで、認可フローと開発用シードが使う
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `oauth2:authorized_client:{provider}:{user_id}` | 認可情報 (JSON) | 有効期限 + 1 時間 |
//!
//! TTL に猶予を持たせているのは、期限切れ直後の参照を「未認可」ではなく
//! 「期限切れ」として区別するため。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use songrec_domain::{
    credential::{AccessCredential, AccessToken, ProviderName},
    user::UserId,
};
use thiserror::Error;

use crate::InfraError;

/// 期限切れ後もキーを保持する秒数
const EXPIRED_RETENTION_SECONDS: i64 = 3600;

/// 認可情報の参照エラー
#[derive(Debug, Error)]
pub enum CredentialLookupError {
    /// 認可フローを完了していない
    #[error("認可情報が見つかりません")]
    NotFound,

    /// 認可情報の有効期限が切れている
    #[error("認可情報の有効期限が切れています（期限: {expired_at}）")]
    Expired { expired_at: DateTime<Utc> },

    /// ストアの障害
    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// 認可情報ストアトレイト
///
/// テスト時にインメモリ実装を差し込めるようトレイトで定義。
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 認可情報を取得する
    ///
    /// # 戻り値
    ///
    /// 有効な認可情報があれば `AccessCredential`。
    /// 存在しなければ `NotFound`、期限切れなら `Expired`。
    async fn lookup(
        &self,
        provider: &ProviderName,
        user_id: &UserId,
    ) -> Result<AccessCredential, CredentialLookupError>;
}

/// Redis に保存する認可情報の形式
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredCredential {
    provider:     ProviderName,
    user_id:      UserId,
    access_token: String,
    issued_at:    DateTime<Utc>,
    expires_at:   Option<DateTime<Utc>>,
}

impl From<&AccessCredential> for StoredCredential {
    fn from(credential: &AccessCredential) -> Self {
        Self {
            provider:     credential.provider().clone(),
            user_id:      credential.user_id().clone(),
            access_token: credential.token().expose_secret().to_string(),
            issued_at:    credential.issued_at(),
            expires_at:   credential.expires_at(),
        }
    }
}

impl From<StoredCredential> for AccessCredential {
    fn from(stored: StoredCredential) -> Self {
        AccessCredential::new(
            stored.provider,
            stored.user_id,
            AccessToken::new(stored.access_token),
            stored.issued_at,
            stored.expires_at,
        )
    }
}

/// 有効期限チェックを共通化する
///
/// インメモリ実装からも使う。
pub(crate) fn ensure_not_expired(
    credential: AccessCredential,
    now: DateTime<Utc>,
) -> Result<AccessCredential, CredentialLookupError> {
    match credential.expires_at() {
        Some(expired_at) if credential.is_expired_at(now) => {
            Err(CredentialLookupError::Expired { expired_at })
        }
        _ => Ok(credential),
    }
}

/// Redis を使用した認可情報ストア
#[derive(Clone)]
pub struct RedisCredentialStore {
    conn: ConnectionManager,
}

impl RedisCredentialStore {
    /// 新しい RedisCredentialStore を作成する
    ///
    /// # 引数
    ///
    /// - `redis_url`: Redis 接続 URL（例: `redis://localhost:6379`）
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let conn = crate::redis::create_connection_manager(redis_url).await?;
        Ok(Self { conn })
    }

    /// 既存の接続マネージャから作成する
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// 認可情報キーを生成する
    pub(crate) fn credential_key(provider: &ProviderName, user_id: &UserId) -> String {
        format!("oauth2:authorized_client:{provider}:{user_id}")
    }

    /// 有効期限から TTL（秒）を求める
    ///
    /// 有効期限がなければ `None`（TTL なし）。
    /// 期限切れ済みでも猶予分の TTL は最低 1 秒確保する。
    pub(crate) fn ttl_seconds(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u64> {
        let expires_at = expires_at?;
        let remaining = (expires_at - now).num_seconds() + EXPIRED_RETENTION_SECONDS;
        Some(remaining.max(1) as u64)
    }

    /// 認可情報を保存する（既存の値は上書き）
    ///
    /// 認可フローの完了時に呼び出される。フォワーダからは呼ばない。
    pub async fn save(&self, credential: &AccessCredential) -> Result<(), InfraError> {
        let key = Self::credential_key(credential.provider(), credential.user_id());
        let json = serde_json::to_string(&StoredCredential::from(credential))?;
        let mut conn = self.conn.clone();

        match Self::ttl_seconds(credential.expires_at(), Utc::now()) {
            Some(ttl) => {
                let _: () = conn.set_ex(&key, json, ttl).await?;
            }
            None => {
                let _: () = conn.set(&key, json).await?;
            }
        }

        tracing::debug!(
            provider = %credential.provider(),
            user_id = %credential.user_id(),
            "認可情報を保存しました"
        );
        Ok(())
    }

    /// 認可情報を削除する
    ///
    /// 存在しない認可情報を削除しても成功とする。
    /// 外部の認可フローが連携解除時に呼び出す。BFF 自身は使わない。
    pub async fn remove(&self, provider: &ProviderName, user_id: &UserId) -> Result<(), InfraError> {
        let key = Self::credential_key(provider, user_id);
        let mut conn = self.conn.clone();
        let _: () = conn.del(&key).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn lookup(
        &self,
        provider: &ProviderName,
        user_id: &UserId,
    ) -> Result<AccessCredential, CredentialLookupError> {
        let key = Self::credential_key(provider, user_id);
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(&key).await.map_err(InfraError::from)?;

        let Some(json) = result else {
            return Err(CredentialLookupError::NotFound);
        };

        let stored: StoredCredential = serde_json::from_str(&json).map_err(InfraError::from)?;
        ensure_not_expired(stored.into(), Utc::now())
    }
}
