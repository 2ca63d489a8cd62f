//! The deduplicating [`SourceCache`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared, try_join_all};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{CacheConfig, Decoder, LoadRequest, Loader};
use crate::{Audio, AudioError, AudioResult};

type SharedLoad = Shared<BoxFuture<'static, AudioResult<Audio>>>;

enum CacheEntry {
    /// A load in flight. Every caller for the key awaits this same future.
    /// `id` tells this load apart from later loads of the same key.
    Pending { id: u64, load: SharedLoad },
    /// The decoded result. Handed out as clones only.
    Ready(Audio),
}

struct Inner<L, D> {
    loader: L,
    decoder: D,
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
    next_id: AtomicU64,
}

impl<L: Loader, D: Decoder> Inner<L, D> {
    async fn fetch(&self, key: &str) -> AudioResult<Audio> {
        let bytes = self.loader.load(key).await?;
        self.decode(&bytes).await
    }

    async fn decode(&self, bytes: &[u8]) -> AudioResult<Audio> {
        let decoded = self.decoder.decode(bytes).await?;
        Audio::from_source(decoded, ())
    }
}

/// Deduplicating cache of decoded sources.
///
/// Cloning a `SourceCache` is cheap and shares the underlying map, so one
/// instance can be handed to many tasks.
///
/// Loads run on a spawned tokio task, so a load that has started always
/// finishes even when every caller stops waiting for it. A tokio runtime must
/// be running when [`load`](Self::load) is called.
pub struct SourceCache<L, D> {
    inner: Arc<Inner<L, D>>,
}

impl<L, D> Clone for SourceCache<L, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Loader, D: Decoder> SourceCache<L, D> {
    /// Creates an enabled cache without a base directory.
    pub fn new(loader: L, decoder: D) -> Self {
        Self::with_config(loader, decoder, CacheConfig::default())
    }

    /// Creates a cache with explicit configuration.
    pub fn with_config(loader: L, decoder: D, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                decoder,
                config,
                entries: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// The cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Loads and decodes a source, returning an independent copy.
    ///
    /// If the key is already loading, this waits on that load instead of
    /// starting another one. If it is cached, a clone is returned at once.
    ///
    /// # Errors
    /// Loader and decoder failures are returned to every caller waiting on
    /// the key, and the key is evicted.
    pub async fn load(&self, source_id: &str) -> AudioResult<Audio> {
        let key = self.inner.config.resolve_key(source_id);
        if !self.inner.config.enabled {
            return self.inner.fetch(&key).await;
        }

        let pending = {
            let mut entries = self.inner.entries.lock();
            match entries.get(&key) {
                Some(CacheEntry::Ready(audio)) => {
                    debug!(key = %key, "source cache hit");
                    return Ok(audio.clone());
                }
                Some(CacheEntry::Pending { load, .. }) => {
                    debug!(key = %key, "joining pending load");
                    load.clone()
                }
                None => {
                    debug!(key = %key, "source cache miss");
                    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                    let load = self.start(key.clone(), id);
                    entries.insert(
                        key,
                        CacheEntry::Pending {
                            id,
                            load: load.clone(),
                        },
                    );
                    load
                }
            }
        };
        pending.await
    }

    /// Spawns the load for `key`. On completion the task only touches the
    /// entry if it is still the pending entry `id`.
    fn start(&self, key: String, id: u64) -> SharedLoad {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result = inner.fetch(&task_key).await;
            let mut entries = inner.entries.lock();
            let current = matches!(
                entries.get(&task_key),
                Some(CacheEntry::Pending { id: pending, .. }) if *pending == id
            );
            match &result {
                Ok(audio) if current => {
                    entries.insert(task_key, CacheEntry::Ready(audio.clone()));
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %task_key, error = %err, "load failed, evicting");
                    if current {
                        entries.remove(&task_key);
                    }
                }
            }
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(AudioError::load(key, err.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    /// Loads a batch of requests concurrently, preserving order.
    ///
    /// Fails with the first error encountered.
    pub async fn load_many(&self, requests: Vec<LoadRequest>) -> AudioResult<Vec<Audio>> {
        let loads = requests.into_iter().map(|request| async move {
            match request {
                LoadRequest::Path(path) => self.load(&path).await,
                LoadRequest::Audio(audio) => Ok(audio),
                LoadRequest::Bytes(bytes) => self.decode(&bytes).await,
            }
        });
        try_join_all(loads).await
    }

    /// Decodes bytes directly, bypassing the cache.
    pub async fn decode(&self, bytes: &[u8]) -> AudioResult<Audio> {
        self.inner.decode(bytes).await
    }

    /// Decodes several byte buffers concurrently, failing fast.
    pub async fn decode_many(&self, items: Vec<Vec<u8>>) -> AudioResult<Vec<Audio>> {
        try_join_all(items.iter().map(|bytes| self.decode(bytes))).await
    }

    /// True if the source is cached or loading.
    pub fn contains(&self, source_id: &str) -> bool {
        let key = self.inner.config.resolve_key(source_id);
        self.inner.entries.lock().contains_key(&key)
    }

    /// Drops a source from the cache. A load in flight still completes for
    /// its callers but its result is not stored.
    pub fn evict(&self, source_id: &str) -> bool {
        let key = self.inner.config.resolve_key(source_id);
        self.inner.entries.lock().remove(&key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    /// Number of cached or loading sources.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// True if nothing is cached or loading.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }
}
