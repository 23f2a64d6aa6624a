//! # テスト用インメモリストア
//!
//! ハンドラ・フォワーダのテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! songrec-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use songrec_domain::{
    credential::{AccessCredential, ProviderName},
    user::UserId,
};

use crate::{
    InfraError,
    credential_store::{CredentialLookupError, CredentialStore, ensure_not_expired},
    session::{SessionData, SessionManager},
};

// ===== InMemoryCredentialStore =====

/// インメモリ認可情報ストア
///
/// `lookup` の呼び出し回数を記録する。
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    credentials:  Arc<Mutex<HashMap<(ProviderName, UserId), AccessCredential>>>,
    lookup_count: Arc<AtomicUsize>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 認可情報を登録する（既存の値は上書き）
    pub fn insert(&self, credential: AccessCredential) {
        let key = (credential.provider().clone(), credential.user_id().clone());
        self.credentials.lock().unwrap().insert(key, credential);
    }

    /// `lookup` が呼ばれた回数
    pub fn lookup_count(&self) -> usize {
        self.lookup_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(
        &self,
        provider: &ProviderName,
        user_id: &UserId,
    ) -> Result<AccessCredential, CredentialLookupError> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);

        let credential = self
            .credentials
            .lock()
            .unwrap()
            .get(&(provider.clone(), user_id.clone()))
            .cloned()
            .ok_or(CredentialLookupError::NotFound)?;

        ensure_not_expired(credential, Utc::now())
    }
}

// ===== InMemorySessionManager =====

/// インメモリセッションマネージャ
#[derive(Clone, Default)]
pub struct InMemorySessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 ID のセッションを持つマネージャを作成する
    pub fn with_session(session_id: &str, data: SessionData) -> Self {
        let manager = Self::new();
        manager
            .sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), data);
        manager
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.create_with_id(&session_id, data).await?;
        Ok(session_id)
    }

    async fn create_with_id(
        &self,
        session_id: &str,
        data: &SessionData,
    ) -> Result<(), InfraError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), data.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}
