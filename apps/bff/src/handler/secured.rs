//! # 認可確認ハンドラ
//!
//! 呼び出し元の Spotify 認可情報が利用可能かを確認する。
//! トークンは先頭 4 文字のみ表示する。

use std::sync::Arc;

use axum::{Extension, extract::State};
use songrec_domain::identity::AuthenticatedIdentity;

use crate::forwarder::{CredentialedForwarder, ForwardError};

/// GET /secured
#[tracing::instrument(skip_all)]
pub async fn secured(
    State(forwarder): State<Arc<CredentialedForwarder>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<String, ForwardError> {
    let credential = forwarder.lookup_credential(&identity).await?;
    Ok(format!("Hello Secured! Token: {}", credential.token().masked()))
}
