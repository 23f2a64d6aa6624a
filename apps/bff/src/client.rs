//! # 外部 API クライアント
//!
//! 下流のレコメンドサービスとの通信を担当する。

pub mod recommendation_service;

pub use recommendation_service::{
    ForwardedResponse,
    RecommendationServiceClient,
    RecommendationServiceClientImpl,
    RecommendationServiceError,
};
