//! # BFF エラーハンドリング
//!
//! フォワーダのエラーを HTTP レスポンスへ変換する。
//!
//! | エラー | ステータス | ボディ |
//! |-------|-----------|-------|
//! | `CredentialNotFound` | 401 | `credential-not-found` |
//! | `CredentialExpired` | 401 | `credential-expired` |
//! | `CredentialStoreUnavailable` | 500 | `internal-error` |
//! | 下流が 2xx 以外を返した | 下流のステータス | 下流のボディをそのまま |
//! | 下流がタイムアウト | 504 | `gateway-timeout` |
//! | 下流に接続できない | 502 | `bad-gateway` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use songrec_shared::ErrorResponse;

use crate::{client::RecommendationServiceError, forwarder::ForwardError};

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::CredentialNotFound => {
                tracing::info!(error.category = "authorization", "認可情報が未登録のため拒否しました");
                problem_response(ErrorResponse::new(
                    "credential-not-found",
                    "Unauthorized",
                    401,
                    "Spotify の認可が完了していません",
                ))
            }
            ForwardError::CredentialExpired => {
                tracing::info!(error.category = "authorization", "認可情報が期限切れのため拒否しました");
                problem_response(ErrorResponse::new(
                    "credential-expired",
                    "Unauthorized",
                    401,
                    "Spotify の認可の有効期限が切れています",
                ))
            }
            ForwardError::CredentialStoreUnavailable(e) => {
                tracing::error!(
                    error.category = "infrastructure",
                    error.kind = "credential_store",
                    "認可情報ストアで内部エラー: {}",
                    e
                );
                internal_error_response()
            }
            ForwardError::UpstreamCallFailed(RecommendationServiceError::UpstreamStatus(response)) => {
                tracing::warn!(
                    error.category = "upstream",
                    error.kind = "status",
                    upstream.status = response.status.as_u16(),
                    "レコメンドサービスがエラーを返しました"
                );
                response.into_response()
            }
            ForwardError::UpstreamCallFailed(RecommendationServiceError::Timeout(e)) => {
                tracing::error!(
                    error.category = "upstream",
                    error.kind = "timeout",
                    "レコメンドサービス呼び出しがタイムアウト: {}",
                    e
                );
                problem_response(ErrorResponse::gateway_timeout(
                    "レコメンドサービスが時間内に応答しませんでした",
                ))
            }
            ForwardError::UpstreamCallFailed(RecommendationServiceError::Network(e)) => {
                tracing::error!(
                    error.category = "upstream",
                    error.kind = "network",
                    "レコメンドサービスへの接続に失敗: {}",
                    e
                );
                problem_response(ErrorResponse::bad_gateway(
                    "レコメンドサービスに接続できませんでした",
                ))
            }
        }
    }
}

/// `ErrorResponse` をそのステータスで返す
pub fn problem_response(body: ErrorResponse) -> Response {
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// 未認証エラーレスポンス
pub fn unauthorized_response() -> Response {
    problem_response(ErrorResponse::unauthorized("ログインが必要です"))
}

/// 内部エラーレスポンス
pub fn internal_error_response() -> Response {
    problem_response(ErrorResponse::internal_error())
}
