//! # 認証済みアイデンティティ
//!
//! 外部の認証レイヤーがリクエストごとに生成する、検証済みの呼び出し元情報。
//! ハンドラやフォワーダには引数として明示的に渡され、グローバルなリクエスト
//! コンテキストから取り出されることはない。
//!
//! ## ライフサイクル
//!
//! 1. 認証ミドルウェアがセッションから生成する
//! 2. リクエスト処理中は不変
//! 3. リクエスト終了時に破棄される

use std::collections::BTreeMap;

use crate::user::UserId;

/// 認証済みアイデンティティ
///
/// 安定したユーザー識別子と、プロバイダが付与した属性（キーは一意）を保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    user_id:    UserId,
    attributes: BTreeMap<String, String>,
}

impl AuthenticatedIdentity {
    /// 属性なしのアイデンティティを作成する
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            attributes: BTreeMap::new(),
        }
    }

    /// 属性付きのアイデンティティを作成する
    pub fn with_attributes(user_id: UserId, attributes: BTreeMap<String, String>) -> Self {
        Self {
            user_id,
            attributes,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// 属性を 1 つ取得する
    ///
    /// プロバイダが付与した属性（例: `id`）を参照するハンドラ向けの公開 API。
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
