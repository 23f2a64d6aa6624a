//! # レコメンド中継ハンドラ
//!
//! 下流のレコメンドサービスの応答をステータス・ボディ・`Content-Type` ごと返す。

use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use songrec_domain::identity::AuthenticatedIdentity;

use crate::{
    client::ForwardedResponse,
    forwarder::{CredentialedForwarder, ForwardError},
};

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(content_type) => {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            None => {
                response.headers_mut().remove(CONTENT_TYPE);
            }
        }
        response
    }
}

/// GET /recommend
#[tracing::instrument(skip_all)]
pub async fn recommend(
    State(forwarder): State<Arc<CredentialedForwarder>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<ForwardedResponse, ForwardError> {
    forwarder.forward(&identity).await
}
