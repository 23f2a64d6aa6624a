//! トップページ

/// 固定の挨拶を返す（認証不要）
pub async fn home() -> &'static str {
    "Hello Home!"
}
