//! Chunk cache shared by all worlds.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use hires_anvil::Chunk;
use hires_metrics::RenderMetrics;
use lru::LruCache;

use crate::{ChunkPos, WorldId};

const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Decoded chunks kept across all worlds.
    pub capacity: usize,
    /// Open region handles kept per world.
    pub region_capacity: usize,
    /// Entries older than this are reloaded.
    pub ttl: Duration,
    /// Attempts at reading a chunk from its region before giving up.
    pub load_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            region_capacity: 100,
            ttl: Duration::from_secs(60),
            load_attempts: 3,
            retry_interval: Duration::from_secs(1),
        }
    }
}

struct Entry {
    // Filled once by whichever thread missed first; others wait on it.
    slot: Arc<OnceLock<Arc<Chunk>>>,
    inserted: Instant,
}

pub struct ChunkCache {
    entries: Mutex<LruCache<(WorldId, ChunkPos), Entry>>,
    ttl: Duration,
    metrics: Option<Arc<RenderMetrics>>,
}

impl ChunkCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap());
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
            metrics: None,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl)
    }

    pub fn with_metrics(mut self, metrics: Arc<RenderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Cached chunk, or the result of `load` stored for later calls.
    ///
    /// Concurrent callers missing on the same key run `load` once; the others
    /// block until it finishes and share the result.
    pub fn get_or_load(&self, world: WorldId, pos: ChunkPos, load: impl FnOnce() -> Chunk) -> Arc<Chunk> {
        let key = (world, pos);
        let slot = {
            let mut entries = self.entries.lock().unwrap();
            let fresh = entries
                .get(&key)
                .filter(|e| e.inserted.elapsed() < self.ttl)
                .map(|e| e.slot.clone());
            match fresh {
                Some(slot) => {
                    if let Some(metrics) = &self.metrics { metrics.record_cache_hit(); }
                    slot
                }
                None => {
                    if let Some(metrics) = &self.metrics { metrics.record_cache_miss(); }
                    let slot = Arc::new(OnceLock::new());
                    entries.put(key, Entry { slot: slot.clone(), inserted: Instant::now() });
                    slot
                }
            }
        };
        slot.get_or_init(|| Arc::new(load())).clone()
    }

    pub fn invalidate_chunk(&self, world: WorldId, pos: ChunkPos) {
        self.entries.lock().unwrap().pop(&(world, pos));
    }

    pub fn invalidate_world(&self, world: WorldId) {
        let mut entries = self.entries.lock().unwrap();
        let stale: Vec<_> = entries
            .iter()
            .filter(|((id, _), _)| *id == world)
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            entries.pop(&key);
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
