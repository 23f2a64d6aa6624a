//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。
//!
//! | 変数 | 必須 | デフォルト |
//! |------|------|-----------|
//! | `BFF_HOST` | - | `0.0.0.0` |
//! | `BFF_PORT` | ✓ | - |
//! | `REDIS_URL` | ✓ | - |
//! | `RECOMMEND_URL` | - | `http://127.0.0.1:5000/recommend` |
//! | `RECOMMEND_TIMEOUT_SECS` | - | `10` |
//! | `RECOMMEND_CONNECT_TIMEOUT_SECS` | - | `3` |
//! | `DEV_AUTH_ENABLED` | - | `false` |

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_RECOMMEND_URL: &str = "http://127.0.0.1:5000/recommend";
const DEFAULT_RECOMMEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RECOMMEND_CONNECT_TIMEOUT_SECS: u64 = 3;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("DEV_AUTH_ENABLED=true はリリースビルドでは使用できません")]
    DevAuthInRelease,
}

/// BFF サーバーの設定
#[derive(Debug, Clone)]
pub struct BffConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// Redis 接続 URL（セッションと認可情報）
    pub redis_url: String,
    /// レコメンドサービスの URL
    pub recommend_url: String,
    /// レコメンドサービス呼び出しの全体タイムアウト
    pub recommend_timeout: Duration,
    /// レコメンドサービスへの接続タイムアウト
    pub recommend_connect_timeout: Duration,
    /// 開発用認証バイパス（DevAuth）の有効化
    ///
    /// `DEV_AUTH_ENABLED=true` のときに有効になる。
    /// 本番環境では絶対に有効にしないこと。
    pub dev_auth_enabled: bool,
}

impl BffConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストではプロセスの環境変数を書き換えずに済むよう、こちらを使う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dev_auth_enabled = lookup("DEV_AUTH_ENABLED")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        // 本番環境への誤デプロイを防ぐ
        if dev_auth_enabled && !cfg!(debug_assertions) {
            return Err(ConfigError::DevAuthInRelease);
        }

        Ok(Self {
            host: lookup("BFF_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse(&lookup, "BFF_PORT")?.ok_or(ConfigError::Missing("BFF_PORT"))?,
            redis_url: lookup("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?,
            recommend_url: lookup("RECOMMEND_URL")
                .unwrap_or_else(|| DEFAULT_RECOMMEND_URL.to_string()),
            recommend_timeout: Duration::from_secs(
                parse(&lookup, "RECOMMEND_TIMEOUT_SECS")?.unwrap_or(DEFAULT_RECOMMEND_TIMEOUT_SECS),
            ),
            recommend_connect_timeout: Duration::from_secs(
                parse(&lookup, "RECOMMEND_CONNECT_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_RECOMMEND_CONNECT_TIMEOUT_SECS),
            ),
            dev_auth_enabled,
        })
    }
}

/// 値があればパースする。未設定なら `None`
fn parse<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}
