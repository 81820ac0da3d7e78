//! Keyed query cache with in-flight de-duplication and prefix invalidation.
//!
//! Values are kept as decoded JSON so one cache serves every entity; callers
//! decode into their own types. A fetch for a key that already has a request in
//! flight joins that request instead of issuing a second one.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::error::ApiError;
use crate::filter::{FilterError, QueryParams};
use crate::types::Entity;

/// Hierarchical cache key. The first segment is always the entity's collection
/// path, so invalidating `[entity]` reaches every query about that entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Prefix covering everything cached for an entity
    pub fn entity(entity: Entity) -> Self {
        Self::new([entity.path()])
    }

    /// One page of the entity table for the given view
    pub fn page(entity: Entity, params: &QueryParams) -> Result<Self, FilterError> {
        let mut parts = vec![
            entity.path().to_string(),
            "page".to_string(),
            params.page.to_string(),
            params.page_size.to_string(),
            params.filters_json()?,
        ];
        if let Some(sort) = &params.sort {
            parts.push(sort.field.clone());
        }
        parts.push(params.sort_order().as_param().to_string());
        Ok(Self(parts))
    }

    /// Unfiltered option list used by pickers
    pub fn options(entity: Entity) -> Self {
        Self::new([entity.path(), "list"])
    }

    pub fn detail(entity: Entity, id: i64) -> Self {
        Self::new([entity.path().to_string(), id.to_string()])
    }

    pub fn participant_caregivers(participant_id: i64) -> Self {
        Self::new([
            Entity::Participant.path().to_string(),
            participant_id.to_string(),
            "caregivers".to_string(),
        ])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

struct Pending {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Entry {
    data: Option<Value>,
    stale: bool,
    pending: Option<Pending>,
}

pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch: AtomicU64,
    generation: watch::Sender<u64>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().len())
            .field("generation", &*self.generation.borrow())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            entries: Mutex::new(HashMap::new()),
            next_fetch: AtomicU64::new(1),
            generation,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh cached value, or the result of the in-flight request for `key`, or a
    /// new request built by `fetcher`. Successful results are cached; failures are not.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let (id, fetch) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();

            if !entry.stale {
                if let Some(data) = &entry.data {
                    tracing::debug!(%key, "cache hit");
                    return Ok(data.clone());
                }
            }

            if let Some(pending) = &entry.pending {
                tracing::debug!(%key, "joining in-flight request");
                (pending.id, pending.fetch.clone())
            } else {
                tracing::debug!(%key, stale = entry.stale, "cache miss");
                let id = self.next_fetch.fetch_add(1, Ordering::Relaxed);
                let fetch = fetcher().boxed().shared();
                entry.pending = Some(Pending {
                    id,
                    fetch: fetch.clone(),
                });
                (id, fetch)
            }
        };

        let result = fetch.await;

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return result;
        };
        // An invalidation while in flight drops the pending slot; its result is not stored
        if entry.pending.as_ref().map(|p| p.id) != Some(id) {
            return result;
        }
        entry.pending = None;
        let keep = match &result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.stale = false;
                true
            }
            Err(_) => entry.data.is_some(),
        };
        if !keep {
            entries.remove(key);
        }
        result
    }

    /// Cached value regardless of staleness
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().get(key).map_or(true, |entry| entry.stale || entry.data.is_none())
    }

    pub fn set(&self, key: QueryKey, value: Value) {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.data = Some(value);
        entry.stale = false;
    }

    /// Mark every entry under `prefix` stale and forget their in-flight requests.
    ///
    /// A stale value survives one invalidation so it can still be shown while
    /// the refetch runs. Entries that were already stale, or never held data,
    /// are evicted. Returns how many entries were affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let (count, evicted) = {
            let mut entries = self.lock();
            let before = entries.len();
            let mut count = 0;
            entries.retain(|key, entry| {
                if !key.starts_with(prefix) {
                    return true;
                }
                count += 1;
                if entry.stale || entry.data.is_none() {
                    return false;
                }
                entry.stale = true;
                entry.pending = None;
                true
            });
            (count, before - entries.len())
        };
        self.generation.send_modify(|g| *g += 1);
        tracing::debug!(%prefix, count, evicted, "cache invalidated");
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry under `prefix`
    pub fn remove(&self, prefix: &QueryKey) {
        self.lock().retain(|key, _| !key.starts_with(prefix));
        self.generation.send_modify(|g| *g += 1);
    }

    /// Append `item` to the list cached under `key` unless an element with the
    /// same `id` is already there. Works on bare arrays and on paginated
    /// envelopes (whose `total` is bumped). Returns whether the cache changed.
    pub fn append_if_absent(&self, key: &QueryKey, item: Value) -> bool {
        let mut entries = self.lock();
        let Some(data) = entries.get_mut(key).and_then(|entry| entry.data.as_mut()) else {
            return false;
        };
        let appended = append_by_id(data, item);
        if appended {
            tracing::debug!(%key, "cache patched with new item");
        }
        appended
    }

    /// Bumped after every invalidation; queries watch it to refetch
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

fn append_by_id(data: &mut Value, item: Value) -> bool {
    let id = item.get("id").cloned();
    let (list, total) = match &mut *data {
        Value::Array(list) => (list, None),
        Value::Object(envelope) => {
            let total = envelope.get("total").and_then(Value::as_u64);
            match envelope.get_mut("data") {
                Some(Value::Array(list)) => (list, total),
                _ => return false,
            }
        }
        _ => return false,
    };

    if id.is_some() && list.iter().any(|existing| existing.get("id") == id.as_ref()) {
        return false;
    }
    list.push(item);

    if let (Some(total), Value::Object(envelope)) = (total, data) {
        envelope.insert("total".to_string(), Value::from(total + 1));
    }
    true
}
