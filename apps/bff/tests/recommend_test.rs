//! # レコメンド中継の統合テスト
//!
//! 実際のルーター（認証ミドルウェア・Request ID レイヤー込み）に対してリクエストを送り、
//! 下流のレコメンドサービスは wiremock で代替する。
//!
//! - 認可情報があれば Bearer 付きで 1 回だけ下流を呼ぶ
//! - 下流のステータス・ボディをそのまま返す
//! - 認可情報がなければ下流を呼ばずに 401
//! - 下流が応答しなければ 502 / 504

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{Router, body::Body};
use chrono::Utc;
use http::{Request, StatusCode, header::CONTENT_TYPE};
use pretty_assertions::assert_eq;
use songrec_bff::{
    app_builder::build_app,
    client::RecommendationServiceClientImpl,
    forwarder::CredentialedForwarder,
};
use songrec_domain::{
    credential::{AccessCredential, AccessToken, ProviderName},
    user::UserId,
};
use songrec_infra::{
    SessionData,
    SessionManager,
    mock::{InMemoryCredentialStore, InMemorySessionManager},
};
use tower::ServiceExt;
use wiremock::{
    Mock,
    MockServer,
    ResponseTemplate,
    matchers::{header, method, path},
};

const SESSION_A: &str = "session-a";
const SESSION_B: &str = "session-b";

/// テスト用のアプリケーション
struct TestApp {
    router:           Router,
    credential_store: InMemoryCredentialStore,
}

impl TestApp {
    /// `user-a`（session-a）と `user-b`（session-b）がログイン済みの状態を作る
    async fn new(recommend_url: &str, timeout: Duration) -> Self {
        let session_manager = InMemorySessionManager::new();
        for (session_id, user_id) in [(SESSION_A, "user-a"), (SESSION_B, "user-b")] {
            session_manager
                .create_with_id(
                    session_id,
                    &SessionData::new(UserId::new(user_id).unwrap(), BTreeMap::new()),
                )
                .await
                .unwrap();
        }

        let credential_store = InMemoryCredentialStore::new();
        let client =
            RecommendationServiceClientImpl::new(recommend_url, timeout, Duration::from_secs(1))
                .unwrap();
        let forwarder = Arc::new(CredentialedForwarder::new(
            Arc::new(credential_store.clone()),
            Arc::new(client),
        ));

        Self {
            router: build_app(Arc::new(session_manager), forwarder),
            credential_store,
        }
    }

    async fn for_server(server: &MockServer) -> Self {
        Self::new(&format!("{}/recommend", server.uri()), Duration::from_secs(5)).await
    }

    fn grant(&self, user_id: &str, token: &str, expires_at: Option<chrono::DateTime<Utc>>) {
        self.credential_store.insert(AccessCredential::new(
            ProviderName::spotify(),
            UserId::new(user_id).unwrap(),
            AccessToken::new(token),
            Utc::now(),
            expires_at,
        ));
    }

    async fn get(&self, uri: &str, session_id: Option<&str>) -> (StatusCode, http::HeaderMap, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some(session_id) = session_id {
            builder = builder.header("Cookie", format!("session_id={session_id}"));
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }
}

#[tokio::test]
async fn test_トップページは認証なしで挨拶を返す() {
    let server = MockServer::start().await;
    let app = TestApp::for_server(&server).await;

    let (status, _, body) = app.get("/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Home!");
}

#[tokio::test]
async fn test_ログイン済みでもトップページは同じ() {
    let server = MockServer::start().await;
    let app = TestApp::for_server(&server).await;

    let (status, _, body) = app.get("/", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Home!");
}

#[tokio::test]
async fn test_保存済みトークンをbearerで付与して1回だけ呼ぶ() {
    // Given
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommend"))
        .and(header("authorization", "Bearer token-a"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"tracks":[]}"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", Some(Utc::now() + chrono::Duration::hours(1)));

    // When
    let (status, headers, body) = app.get("/recommend", Some(SESSION_A)).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"tracks":[]}"#);
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
}

#[tokio::test]
async fn test_下流の2xx以外はステータスとボディを中継する() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommend"))
        .respond_with(ResponseTemplate::new(401).set_body_string("The access token expired"))
        .expect(1)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", None);

    let (status, _, body) = app.get("/recommend", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "The access token expired");
}

#[tokio::test]
async fn test_認可情報がなければ下流を呼ばずに401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;

    let (status, _, body) = app.get("/recommend", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let problem: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(problem["type"].as_str().unwrap().ends_with("/credential-not-found"));
}

#[tokio::test]
async fn test_期限切れの認可情報なら下流を呼ばずに401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", Some(Utc::now() - chrono::Duration::minutes(1)));

    let (status, _, body) = app.get("/recommend", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let problem: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(problem["type"].as_str().unwrap().ends_with("/credential-expired"));
}

#[tokio::test]
async fn test_未ログインなら認可情報を参照せずに401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", None);

    let (status, _, _) = app.get("/recommend", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.credential_store.lookup_count(), 0);
}

#[tokio::test]
async fn test_下流に接続できなければ502() {
    // 一度 bind して解放したポートには誰も listen していない
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let app = TestApp::new(&format!("http://{addr}/recommend"), Duration::from_secs(5)).await;
    app.grant("user-a", "token-a", None);

    let (status, _, body) = app.get("/recommend", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.is_empty());
}

#[tokio::test]
async fn test_下流がタイムアウトすれば504() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    let app = TestApp::new(
        &format!("{}/recommend", server.uri()),
        Duration::from_millis(100),
    )
    .await;
    app.grant("user-a", "token-a", None);

    let (status, _, _) = app.get("/recommend", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_同時リクエストはそれぞれ自分のトークンを使う() {
    let server = MockServer::start().await;
    for (token, body) in [("token-a", "for-a"), ("token-b", "for-b")] {
        Mock::given(method("GET"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", None);
    app.grant("user-b", "token-b", None);

    let ((status_a, _, body_a), (status_b, _, body_b)) = tokio::join!(
        app.get("/recommend", Some(SESSION_A)),
        app.get("/recommend", Some(SESSION_B)),
    );

    assert_eq!((status_a, body_a.as_str()), (StatusCode::OK, "for-a"));
    assert_eq!((status_b, body_b.as_str()), (StatusCode::OK, "for-b"));
}

#[tokio::test]
async fn test_request_idが下流に伝播する() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-request-id", "req-from-client"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "token-a", None);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/recommend")
                .header("Cookie", format!("session_id={SESSION_A}"))
                .header("x-request-id", "req-from-client")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-from-client");
}

#[tokio::test]
async fn test_securedはマスクしたトークンを返す() {
    let server = MockServer::start().await;
    let app = TestApp::for_server(&server).await;
    app.grant("user-a", "BQDxSecretValue", None);

    let (status, _, body) = app.get("/secured", Some(SESSION_A)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello Secured! Token: BQDx****");
    assert!(!body.contains("SecretValue"));
}

#[tokio::test]
async fn test_securedは認可情報がなければ401() {
    let server = MockServer::start().await;
    let app = TestApp::for_server(&server).await;

    let (status, _, _) = app.get("/secured", Some(SESSION_B)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ヘルスチェック() {
    let server = MockServer::start().await;
    let app = TestApp::for_server(&server).await;

    let (status, _, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
