//! # ヘルスチェックハンドラ
//!
//! `/health` — Liveness Check（常に `"healthy"` を返す）。
//! 依存サービスの状態は確認しない。

use axum::Json;
use songrec_shared::HealthResponse;

/// BFF のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
