//! # BFF アプリケーション構築
//!
//! State の組み立てとルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use songrec_infra::SessionManager;
use songrec_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    forwarder::CredentialedForwarder,
    handler::{health_check, home, recommend, secured},
    middleware::{AuthnState, request_id::store_request_id, require_identity},
};

/// ルーターを構築する
///
/// `/recommend` と `/secured` には認証ミドルウェアを適用する。
pub fn build_app(
    session_manager: Arc<dyn SessionManager>,
    forwarder: Arc<CredentialedForwarder>,
) -> Router {
    let authn_state = AuthnState { session_manager };

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/recommend", get(recommend))
                .route("/secured", get(secured))
                .layer(from_fn_with_state(authn_state, require_identity))
                .with_state(forwarder),
        )
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（クライアント提供値があればそれを使用）
        // 2. TraceLayer: スパンに request_id を含める
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. store_request_id: task-local に保存し、レコメンドサービス呼び出しへ伝播
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
