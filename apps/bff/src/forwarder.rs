//! # 認可情報付きフォワーダ
//!
//! 認証済みアイデンティティに紐づく Spotify のアクセストークンを取得し、
//! Bearer として付与したうえでレコメンドサービスを 1 回呼び出す。
//!
//! ## 処理の流れ
//!
//! ```text
//! AuthenticatedIdentity
//!   → CredentialStore::lookup("spotify", user_id)
//!   → RecommendationServiceClient::fetch_recommendations(token)
//!   → ForwardedResponse（ステータス・ボディをそのまま）
//! ```
//!
//! 認可情報の参照に失敗した場合、下流サービスは呼び出さない。
//! 認可情報は読み取るだけで、変更もキャッシュもしない。

use std::sync::Arc;

use songrec_domain::{
    credential::{AccessCredential, ProviderName},
    identity::AuthenticatedIdentity,
};
use songrec_infra::{CredentialLookupError, CredentialStore, InfraError};
use thiserror::Error;

use crate::client::{ForwardedResponse, RecommendationServiceClient, RecommendationServiceError};

/// フォワードエラー
#[derive(Debug, Error)]
pub enum ForwardError {
    /// 認可フローが未完了
    #[error("認可情報が見つかりません")]
    CredentialNotFound,

    /// 認可情報の有効期限切れ
    #[error("認可情報の有効期限が切れています")]
    CredentialExpired,

    /// 認可情報ストアの障害
    #[error("認可情報ストアが利用できません: {0}")]
    CredentialStoreUnavailable(#[source] InfraError),

    /// 下流サービスの呼び出し失敗
    #[error("レコメンドサービスの呼び出しに失敗しました: {0}")]
    UpstreamCallFailed(#[from] RecommendationServiceError),
}

impl From<CredentialLookupError> for ForwardError {
    fn from(err: CredentialLookupError) -> Self {
        match err {
            CredentialLookupError::NotFound => ForwardError::CredentialNotFound,
            CredentialLookupError::Expired { .. } => ForwardError::CredentialExpired,
            CredentialLookupError::Infra(e) => ForwardError::CredentialStoreUnavailable(e),
        }
    }
}

/// 認可情報付きフォワーダ
pub struct CredentialedForwarder {
    provider:              ProviderName,
    credential_store:      Arc<dyn CredentialStore>,
    recommendation_client: Arc<dyn RecommendationServiceClient>,
}

impl CredentialedForwarder {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        recommendation_client: Arc<dyn RecommendationServiceClient>,
    ) -> Self {
        Self {
            provider: ProviderName::spotify(),
            credential_store,
            recommendation_client,
        }
    }

    /// アイデンティティに紐づく有効な認可情報を取得する
    pub async fn lookup_credential(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<AccessCredential, ForwardError> {
        let credential = self
            .credential_store
            .lookup(&self.provider, identity.user_id())
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    provider = %self.provider,
                    user_id = %identity.user_id(),
                    "認可情報を取得できませんでした: {}",
                    e
                );
            })?;
        Ok(credential)
    }

    /// レコメンドサービスへフォワードする
    ///
    /// 2xx 以外のレスポンスは [`ForwardError::UpstreamCallFailed`] として返す。
    pub async fn forward(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<ForwardedResponse, ForwardError> {
        let credential = self.lookup_credential(identity).await?;

        let response = self
            .recommendation_client
            .fetch_recommendations(credential.token())
            .await?;

        tracing::debug!(
            user_id = %identity.user_id(),
            status = response.status.as_u16(),
            "レコメンドサービスの応答を中継します"
        );
        Ok(response)
    }
}
