//! Output caching for actions that declare a [`CachePolicy`].
//!
//! Only successful responses to GET actions are stored. The key is built from
//! the verb and lower-cased path, plus the query string and request headers
//! when the policy varies by them. Query pairs are ordered by name; repeated
//! values of one name keep their request order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use http::{HeaderMap, Response, StatusCode};
use swiftapi_core::contract::{CachePolicy, HttpVerb};

/// Identifies one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a request under `policy`.
    #[must_use]
    pub fn derive(
        verb: HttpVerb,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        policy: &CachePolicy,
    ) -> Self {
        let mut key = format!("{} {}", verb.as_str(), path.to_lowercase());

        if policy.vary_by_query {
            let mut pairs: Vec<&str> = query
                .unwrap_or_default()
                .split('&')
                .filter(|p| !p.is_empty())
                .collect();
            pairs.sort_by(|a, b| query_name(a).cmp(query_name(b)));
            key.push('?');
            key.push_str(&pairs.join("&"));
        }

        if policy.vary_by_header {
            let mut entries: Vec<String> = headers
                .iter()
                .map(|(name, value)| {
                    format!("{}={}", name.as_str(), String::from_utf8_lossy(value.as_bytes()))
                })
                .collect();
            entries.sort_unstable();
            key.push('#');
            key.push_str(&entries.join(";"));
        }

        Self(key)
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn query_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name)
}

/// A stored response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CachedResponse {
    /// Copies a response for storage.
    #[must_use]
    pub fn from_response(response: &Response<Bytes>) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }

    /// Rebuilds the response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Storage for cached responses.
#[async_trait]
pub trait OutputCache: Send + Sync {
    /// Returns the live entry for `key`, if any.
    async fn get(&self, key: &CacheKey) -> Option<CachedResponse>;

    /// Stores `response` for `ttl`.
    async fn put(&self, key: CacheKey, response: CachedResponse, ttl: Duration);
}

/// Inserts between two sweeps of expired entries.
const SWEEP_INTERVAL: usize = 64;

/// Expiry instant, or `None` for a ttl too large to represent.
type Expiry = Option<Instant>;

fn is_live(expires_at: Expiry, now: Instant) -> bool {
    expires_at.map_or(true, |at| at > now)
}

/// An in-process [`OutputCache`].
///
/// Expired entries are dropped when looked up and swept from the whole map
/// every few inserts, so keys that are never requested again do not pile up.
#[derive(Debug, Default)]
pub struct MemoryOutputCache {
    entries: DashMap<CacheKey, (Expiry, CachedResponse)>,
    inserts: AtomicUsize,
}

impl MemoryOutputCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (expires_at, _)| is_live(*expires_at, now));
    }
}

#[async_trait]
impl OutputCache for MemoryOutputCache {
    async fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            let (expires_at, response) = entry.value();
            if is_live(*expires_at, now) {
                return Some(response.clone());
            }
        }
        self.entries.remove_if(key, |_, (expires_at, _)| !is_live(*expires_at, now));
        None
    }

    async fn put(&self, key: CacheKey, response: CachedResponse, ttl: Duration) {
        if self.inserts.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.purge_expired();
        }
        self.entries.insert(key, (Instant::now().checked_add(ttl), response));
    }
}

/// Whether a response to `verb` may be stored.
pub(crate) fn is_storable(verb: HttpVerb, response: &Response<Bytes>) -> bool {
    verb == HttpVerb::Get && response.status().is_success()
}
