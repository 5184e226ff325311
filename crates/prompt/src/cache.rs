//! Assembled-prompt cache.
//!
//! Keyed by `(primary intent, last topic, language)`, TTL-bound, with
//! capacity-bound oldest-first eviction. Methods take an explicit `now`
//! so expiry is deterministic under test.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

/// The cache key: one per `(intent, topic, language)` combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromptCacheKey {
    pub intent: String,
    pub topic: String,
    pub language: String,
}

/// One cached assembled prompt.
#[derive(Debug, Clone)]
pub struct PromptCacheEntry {
    pub prompt_text: String,
    pub timestamp: DateTime<Utc>,
}

/// TTL- and capacity-bound prompt cache.
#[derive(Debug)]
pub struct PromptCache {
    entries: HashMap<PromptCacheKey, PromptCacheEntry>,
    order: VecDeque<PromptCacheKey>,
    ttl: Duration,
    capacity: usize,
}

impl PromptCache {
    pub fn new(ttl_secs: u64, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl: Duration::seconds(ttl_secs as i64),
            capacity,
        }
    }

    /// Fetch a live entry; expired entries are dropped on access.
    pub fn get(&mut self, key: &PromptCacheKey, now: DateTime<Utc>) -> Option<String> {
        let entry = self.entries.get(key)?;
        if now - entry.timestamp >= self.ttl {
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }
        Some(entry.prompt_text.clone())
    }

    /// Insert, evicting oldest-first past capacity.
    pub fn insert(&mut self, key: PromptCacheKey, prompt_text: String, now: DateTime<Utc>) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        self.entries.insert(
            key.clone(),
            PromptCacheEntry {
                prompt_text,
                timestamp: now,
            },
        );
        self.order.push_back(key);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(intent: &str) -> PromptCacheKey {
        PromptCacheKey {
            intent: intent.into(),
            topic: "pricing".into(),
            language: "pl".into(),
        }
    }

    #[test]
    fn hit_within_ttl_returns_identical_text() {
        let mut cache = PromptCache::new(3600, 8);
        let now = Utc::now();
        cache.insert(key("a"), "payload".into(), now);

        let first = cache.get(&key("a"), now + Duration::seconds(10)).unwrap();
        let second = cache.get(&key("a"), now + Duration::seconds(20)).unwrap();
        assert_eq!(first, "payload");
        assert_eq!(first, second);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let mut cache = PromptCache::new(60, 8);
        let now = Utc::now();
        cache.insert(key("a"), "payload".into(), now);

        assert!(cache.get(&key("a"), now + Duration::seconds(59)).is_some());
        assert!(cache.get(&key("a"), now + Duration::seconds(60)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut cache = PromptCache::new(3600, 2);
        let now = Utc::now();
        cache.insert(key("a"), "A".into(), now);
        cache.insert(key("b"), "B".into(), now + Duration::seconds(1));
        cache.insert(key("c"), "C".into(), now + Duration::seconds(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a"), now + Duration::seconds(3)).is_none());
        assert!(cache.get(&key("b"), now + Duration::seconds(3)).is_some());
        assert!(cache.get(&key("c"), now + Duration::seconds(3)).is_some());
    }

    #[test]
    fn reinsert_refreshes_position_and_text() {
        let mut cache = PromptCache::new(3600, 2);
        let now = Utc::now();
        cache.insert(key("a"), "A1".into(), now);
        cache.insert(key("b"), "B".into(), now);
        cache.insert(key("a"), "A2".into(), now + Duration::seconds(1));
        cache.insert(key("c"), "C".into(), now + Duration::seconds(2));

        // "b" was oldest after the re-insert of "a".
        assert!(cache.get(&key("b"), now + Duration::seconds(3)).is_none());
        assert_eq!(
            cache.get(&key("a"), now + Duration::seconds(3)).unwrap(),
            "A2"
        );
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let mut cache = PromptCache::new(3600, 8);
        let now = Utc::now();
        let mut other = key("a");
        other.language = "en".into();

        cache.insert(key("a"), "polish".into(), now);
        cache.insert(other.clone(), "english".into(), now);

        assert_eq!(cache.get(&key("a"), now).unwrap(), "polish");
        assert_eq!(cache.get(&other, now).unwrap(), "english");
    }
}
