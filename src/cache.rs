//! 解析结果缓存
//!
//! 以 (语言, 哈希) 为键记住整段渲染完成的替换文本，重复渲染
//! 相同内容时跳过存储查询。键值接口只有 get/set，淘汰策略
//! 交给后端实现；进程内实现用 LRU 加可选 TTL。

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;

/// 解析缓存键：语言 + (generated hash，缺失时退到 found hash)
pub fn cache_key(
    target_language: &str,
    generated_hash: Option<&str>,
    found_hash: Option<&str>,
) -> String {
    let hash = generated_hash.or(found_hash).unwrap_or_default();
    format!("{}{}", target_language, hash)
}

/// 缓存后端接口
///
/// 不设显式失效：翻译在条目写入后变更的，要等条目生命周期
/// 结束或外部清除。后端可以是进程内的，也可以是共享的；
/// 并发覆盖按后写者赢处理，不加锁协调。
pub trait CacheStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

struct TimedValue {
    value: String,
    created_at: Instant,
}

/// 进程内 LRU 缓存
///
/// TTL 可选：不设置时条目只按容量淘汰。
pub struct LruResolutionCache {
    entries: RwLock<LruCache<String, TimedValue>>,
    ttl: Option<Duration>,
}

impl LruResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1000).expect("default capacity is non-zero"));
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for LruResolutionCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write().expect("cache lock poisoned");

        if let Some(entry) = entries.get(key) {
            if let Some(ttl) = self.ttl {
                if entry.created_at.elapsed() > ttl {
                    entries.pop(key);
                    return None;
                }
            }
            return Some(entry.value.clone());
        }
        None
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.put(
            key.to_string(),
            TimedValue {
                value,
                created_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_prefers_generated_hash() {
        assert_eq!(cache_key("fr", Some("gen"), Some("found")), "frgen");
        assert_eq!(cache_key("fr", None, Some("found")), "frfound");
        assert_eq!(cache_key("fr", None, None), "fr");
    }

    #[test]
    fn test_get_absent_then_set_then_get() {
        let cache = LruResolutionCache::new(16);
        assert_eq!(cache.get("frabc"), None);

        cache.set("frabc", "<p>bonjour</p>".to_string());
        assert_eq!(cache.get("frabc"), Some("<p>bonjour</p>".to_string()));
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let cache = LruResolutionCache::new(16);
        cache.set("k", "first".to_string());
        cache.set("k", "second".to_string());
        assert_eq!(cache.get("k"), Some("second".to_string()));
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = LruResolutionCache::new(2);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.set("c", "3".to_string());

        // 最旧的条目被淘汰
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = LruResolutionCache::with_ttl(16, Some(Duration::from_millis(1)));
        cache.set("k", "v".to_string());
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get("k"), None);
    }
}
