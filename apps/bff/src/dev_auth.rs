//! # 開発用認証バイパス（DevAuth）
//!
//! 認可フローを通さずに `/recommend` を試すための仕組み。
//!
//! ## 使い方
//!
//! 1. `DEV_AUTH_ENABLED=true` を設定して BFF を起動
//! 2. Spotify のトークンを試す場合は `DEV_SPOTIFY_ACCESS_TOKEN` も設定
//! 3. Cookie `session_id=dev-session` を付けてリクエスト
//!
//! ## 安全策
//!
//! - `dev-auth` feature と `DEV_AUTH_ENABLED` の両方が必要
//! - リリースビルドでは設定読み込みの時点でエラー
//! - 起動時に警告ログを出力

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use songrec_domain::{
    credential::{AccessCredential, AccessToken, ProviderName},
    user::UserId,
};
use songrec_infra::{SessionData, SessionManager};

/// 開発用セッション ID
///
/// クライアントはこの値を Cookie `session_id` に設定する。
pub const DEV_SESSION_ID: &str = "dev-session";

/// 開発用ユーザー ID
pub const DEV_USER_ID: &str = "dev-user";

/// 開発用トークンの有効期間（Spotify のアクセストークンと同じ 1 時間）
const DEV_TOKEN_LIFETIME_HOURS: i64 = 1;

/// 開発用セッションをセットアップする
///
/// 既存の開発用セッションは作り直す。
pub async fn setup_dev_session<S>(session_manager: &S) -> anyhow::Result<UserId>
where
    S: SessionManager + ?Sized,
{
    let user_id = UserId::new(DEV_USER_ID)?;
    let session_data = SessionData::new(
        user_id.clone(),
        BTreeMap::from([("id".to_string(), DEV_USER_ID.to_string())]),
    );

    session_manager.delete(DEV_SESSION_ID).await?;
    session_manager
        .create_with_id(DEV_SESSION_ID, &session_data)
        .await?;

    Ok(user_id)
}

/// 開発用ユーザーの Spotify 認可情報を作成する
pub fn dev_credential(user_id: UserId, token: &str) -> AccessCredential {
    let now = Utc::now();
    AccessCredential::new(
        ProviderName::spotify(),
        user_id,
        AccessToken::new(token),
        now,
        Some(now + Duration::hours(DEV_TOKEN_LIFETIME_HOURS)),
    )
}
