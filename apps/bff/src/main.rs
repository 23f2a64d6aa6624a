//! # SongRec BFF サーバー
//!
//! ## 起動方法
//!
//! ```bash
//! BFF_PORT=13000 REDIS_URL=redis://localhost:16379 cargo run -p songrec-bff
//! ```
//!
//! 設定項目は [`songrec_bff::config`] を参照。

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use songrec_bff::{
    app_builder::build_app,
    client::RecommendationServiceClientImpl,
    config::BffConfig,
    forwarder::CredentialedForwarder,
};
use songrec_infra::{RedisCredentialStore, RedisSessionManager, SessionManager};
use songrec_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("bff"));
    let _tracing_guard = tracing::info_span!("app", service = "bff").entered();

    let config = BffConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!("BFF サーバーを起動します: {}:{}", config.host, config.port);

    // セッションと認可情報で 1 つの接続マネージャを共有する
    let redis_conn = songrec_infra::redis::create_connection_manager(&config.redis_url)
        .await
        .context("Redis への接続に失敗しました")?;
    let session_manager = RedisSessionManager::from_connection_manager(redis_conn.clone());
    let credential_store = RedisCredentialStore::from_connection_manager(redis_conn);

    #[cfg(feature = "dev-auth")]
    if config.dev_auth_enabled {
        seed_dev_auth(&session_manager, &credential_store).await;
    }

    let recommendation_client = RecommendationServiceClientImpl::new(
        &config.recommend_url,
        config.recommend_timeout,
        config.recommend_connect_timeout,
    )
    .context("HTTP クライアントの初期化に失敗しました")?;

    let forwarder = Arc::new(CredentialedForwarder::new(
        Arc::new(credential_store),
        Arc::new(recommendation_client),
    ));
    let session_manager: Arc<dyn SessionManager> = Arc::new(session_manager);

    let app = build_app(session_manager, forwarder);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "BFF サーバーが起動しました: {} (recommend_url = {})",
        addr,
        config.recommend_url
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// 開発用セッションと（設定されていれば）認可情報を作成する
///
/// 失敗してもサーバーは起動を続ける。
#[cfg(feature = "dev-auth")]
async fn seed_dev_auth(
    session_manager: &RedisSessionManager,
    credential_store: &RedisCredentialStore,
) {
    use songrec_bff::dev_auth;

    tracing::warn!("========================================");
    tracing::warn!("⚠️  DevAuth が有効です！");
    tracing::warn!("   本番環境では絶対に有効にしないでください");
    tracing::warn!("========================================");

    let user_id = match dev_auth::setup_dev_session(session_manager).await {
        Ok(user_id) => {
            tracing::info!("DevAuth: 開発用セッションを作成しました");
            tracing::info!("  User ID: {}", user_id);
            tracing::info!("  Session ID: {}", dev_auth::DEV_SESSION_ID);
            user_id
        }
        Err(e) => {
            tracing::error!("DevAuth: セッション作成に失敗しました: {}", e);
            return;
        }
    };

    let Ok(token) = std::env::var("DEV_SPOTIFY_ACCESS_TOKEN") else {
        tracing::info!("DevAuth: DEV_SPOTIFY_ACCESS_TOKEN が未設定のため認可情報は作成しません");
        return;
    };

    let credential = dev_auth::dev_credential(user_id, &token);
    match credential_store.save(&credential).await {
        Ok(()) => tracing::info!(
            "DevAuth: 開発用の認可情報を保存しました（Token: {}）",
            credential.token().masked()
        ),
        Err(e) => tracing::error!("DevAuth: 認可情報の保存に失敗しました: {}", e),
    }
}
