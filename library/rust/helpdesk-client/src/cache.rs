//! アクセストークン用の TTL キャッシュ。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::CacheError;

/// トークンキャッシュキーの接頭辞。
pub const TOKEN_CACHE_KEY_PREFIX: &str = "helpdesk_token_";

/// メールアドレスからトークンキャッシュキーを導出する。
///
/// 同じメールアドレスは常に同じキーになる。ハッシュは名前空間化のためだけに使い、
/// 認証には使わない。
pub fn token_cache_key(email: &str) -> String {
    let digest = Sha256::digest(email.as_bytes());
    format!("{TOKEN_CACHE_KEY_PREFIX}{}", hex::encode(digest))
}

/// TokenCache は有効期限付きのキー・バリューキャッシュを表すトレイト。
///
/// ホストプロセスが所有する共有キャッシュを想定し、`Send + Sync` を要求する。
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// 有効な値があれば返す。期限切れは `None`。
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 値を TTL 付きで保存する。既存の値と有効期限は上書きされる。
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 値を削除する。存在しなくてもエラーにしない。
    async fn forget(&self, key: &str) -> Result<(), CacheError>;
}

struct Entry {
    value: String,
    /// `None` は期限なし（TTL が Instant の表現範囲を超えた場合）。
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map_or(false, |exp| exp <= Instant::now())
    }
}

/// InMemoryTokenCache はプロセス内 HashMap による TokenCache 実装。
///
/// 期限切れエントリは読み取り時には無視され、次の書き込み時にまとめて削除される。
#[derive(Clone, Default)]
pub struct InMemoryTokenCache {
    store: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 期限切れを含む保持中のエントリ数。
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired());
        store.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cache_key_is_deterministic() {
        assert_eq!(token_cache_key("a@b.com"), token_cache_key("a@b.com"));
    }

    #[test]
    fn test_token_cache_key_differs_per_email() {
        assert_ne!(token_cache_key("a@b.com"), token_cache_key("A@b.com"));
        assert_ne!(token_cache_key("a@b.com"), token_cache_key("a@b.co"));
    }

    #[test]
    fn test_token_cache_key_format() {
        let key = token_cache_key("a@b.com");
        assert!(key.starts_with(TOKEN_CACHE_KEY_PREFIX));
        let hash = &key[TOKEN_CACHE_KEY_PREFIX.len()..];
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = InMemoryTokenCache::new();
        cache.put("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let cache = InMemoryTokenCache::new();
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = InMemoryTokenCache::new();
        cache.put("k", "v1", Duration::from_secs(60)).await.unwrap();
        cache.put("k", "v2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryTokenCache::new();
        cache.put("k", "v", Duration::from_millis(50)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_purges_expired_entries() {
        let cache = InMemoryTokenCache::new();
        cache.put("old", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.put("new", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_with_huge_ttl_does_not_overflow() {
        let cache = InMemoryTokenCache::new();
        cache.put("k", "v", Duration::MAX).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));

        cache.put("other", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_forget() {
        let cache = InMemoryTokenCache::new();
        cache.put("k", "v", Duration::from_secs(60)).await.unwrap();
        cache.forget("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_forget_missing_is_noop() {
        let cache = InMemoryTokenCache::new();
        assert!(cache.forget("missing").await.is_ok());
    }
}
