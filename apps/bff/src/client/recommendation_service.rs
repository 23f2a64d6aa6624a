//! # レコメンドサービスクライアント
//!
//! アクセストークンを Bearer として付与し、レコメンドサービスを 1 回だけ呼び出す。
//!
//! ## 設計方針
//!
//! | 項目 | 方針 |
//! |------|------|
//! | レスポンス | ステータス・ボディ・`Content-Type` をパースせずそのまま保持 |
//! | タイムアウト | 全体タイムアウトと接続タイムアウトを起動時に設定 |
//! | リトライ | しない |
//! | コネクション | `reqwest::Client` を 1 つ作成し、プールを全リクエストで共有 |

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
};
use songrec_domain::credential::AccessToken;

use crate::middleware::request_id::inject_request_id;

/// 下流サービスのレスポンス
///
/// 中身は解釈しない。
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status:       StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body:         Bytes,
}

/// レコメンドサービス呼び出しエラー
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    /// 下流サービスが 2xx 以外を返した
    #[error("レコメンドサービスがエラーを返しました: {}", .0.status)]
    UpstreamStatus(ForwardedResponse),

    /// タイムアウト（レスポンスなし）
    #[error("レコメンドサービスの呼び出しがタイムアウトしました: {0}")]
    Timeout(String),

    /// 接続失敗などの通信エラー（レスポンスなし）
    #[error("ネットワークエラー: {0}")]
    Network(String),
}

impl From<reqwest::Error> for RecommendationServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecommendationServiceError::Timeout(err.to_string())
        } else {
            RecommendationServiceError::Network(err.to_string())
        }
    }
}

/// レコメンドサービスクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait RecommendationServiceClient: Send + Sync {
    /// レコメンドを取得する
    ///
    /// `Authorization: Bearer <token>` を付与して GET を 1 回発行する。
    /// 2xx 以外のレスポンスは [`RecommendationServiceError::UpstreamStatus`] として返す。
    async fn fetch_recommendations(
        &self,
        token: &AccessToken,
    ) -> Result<ForwardedResponse, RecommendationServiceError>;
}

/// レコメンドサービスクライアント実装
#[derive(Clone)]
pub struct RecommendationServiceClientImpl {
    url:    String,
    client: reqwest::Client,
}

impl RecommendationServiceClientImpl {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `url`: レコメンドエンドポイントの URL（例: `http://127.0.0.1:5000/recommend`）
    /// - `timeout`: リクエスト全体のタイムアウト
    /// - `connect_timeout`: 接続確立のタイムアウト
    pub fn new(
        url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl RecommendationServiceClient for RecommendationServiceClientImpl {
    async fn fetch_recommendations(
        &self,
        token: &AccessToken,
    ) -> Result<ForwardedResponse, RecommendationServiceError> {
        let request = self
            .client
            .get(&self.url)
            .bearer_auth(token.expose_secret());
        let response = inject_request_id(request).send().await?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = match response.bytes().await {
            Ok(body) => body,
            // 2xx 以外はボディが途切れてもステータスを優先して返す
            Err(e) if !status.is_success() => {
                tracing::warn!(
                    upstream.status = status.as_u16(),
                    "レコメンドサービスのエラーボディを読み切れませんでした: {}",
                    e
                );
                Bytes::new()
            }
            Err(e) => return Err(e.into()),
        };

        let forwarded = ForwardedResponse {
            status,
            content_type,
            body,
        };

        if status.is_success() {
            Ok(forwarded)
        } else {
            Err(RecommendationServiceError::UpstreamStatus(forwarded))
        }
    }
}
