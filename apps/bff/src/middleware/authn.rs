//! # 認証ミドルウェア
//!
//! Cookie `session_id` からセッションを解決し、[`AuthenticatedIdentity`] を
//! リクエスト extensions に格納する。ハンドラは `Extension<AuthenticatedIdentity>`
//! で受け取る。
//!
//! | 状況 | レスポンス |
//! |------|-----------|
//! | Cookie なし / セッションなし | 401 |
//! | セッションストア障害 | 500 |
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/recommend", get(recommend))
//!     .layer(from_fn_with_state(authn_state, require_identity))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use songrec_infra::SessionManager;

use crate::error::{internal_error_response, unauthorized_response};

/// セッション Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthnState {
    pub session_manager: Arc<dyn SessionManager>,
}

/// 認証ミドルウェア
pub async fn require_identity(
    State(state): State<AuthnState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(session_id) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()) else {
        return unauthorized_response();
    };

    match state.session_manager.get(&session_id).await {
        Ok(Some(session)) => {
            let identity = session.to_identity();
            tracing::debug!(user_id = %identity.user_id(), "セッションを解決しました");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => unauthorized_response(),
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "セッション取得で内部エラー: {}",
                e
            );
            internal_error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use axum::{
        Extension,
        Router,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use songrec_domain::{identity::AuthenticatedIdentity, user::UserId};
    use songrec_infra::{InfraError, SessionData, mock::InMemorySessionManager};
    use tower::ServiceExt;

    use super::*;

    /// 認証済みユーザー ID をそのまま返すハンドラ
    async fn whoami(Extension(identity): Extension<AuthenticatedIdentity>) -> String {
        identity.user_id().to_string()
    }

    /// 常に失敗する SessionManager
    struct FailingSessionManager;

    #[async_trait]
    impl SessionManager for FailingSessionManager {
        async fn create(&self, _data: &SessionData) -> Result<String, InfraError> {
            Err(InfraError::InvalidData("unavailable".to_string()))
        }

        async fn create_with_id(
            &self,
            _session_id: &str,
            _data: &SessionData,
        ) -> Result<(), InfraError> {
            Err(InfraError::InvalidData("unavailable".to_string()))
        }

        async fn get(&self, _session_id: &str) -> Result<Option<SessionData>, InfraError> {
            Err(InfraError::InvalidData("unavailable".to_string()))
        }

        async fn delete(&self, _session_id: &str) -> Result<(), InfraError> {
            Err(InfraError::InvalidData("unavailable".to_string()))
        }
    }

    fn app(session_manager: Arc<dyn SessionManager>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(
                AuthnState { session_manager },
                require_identity,
            ))
    }

    fn request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_有効なセッションでアイデンティティが渡される() {
        // Given
        let sut = app(Arc::new(InMemorySessionManager::with_session(
            "session-1",
            SessionData::new(UserId::new("user-1").unwrap(), BTreeMap::new()),
        )));

        // When
        let response = sut.oneshot(request(Some("session_id=session-1"))).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"user-1");
    }

    #[tokio::test]
    async fn test_cookieなしは401() {
        let sut = app(Arc::new(InMemorySessionManager::new()));

        let response = sut.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_存在しないセッションは401() {
        let sut = app(Arc::new(InMemorySessionManager::new()));

        let response = sut.oneshot(request(Some("session_id=unknown"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_セッションストア障害は500() {
        let sut = app(Arc::new(FailingSessionManager));

        let response = sut.oneshot(request(Some("session_id=session-1"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
