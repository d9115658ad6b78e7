//! Worlds stored as Anvil region files.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use hires_anvil::{Chunk, ChunkLoader, LoaderOptions, RegionFile, RegionPos};
use hires_metrics::RenderMetrics;
use lru::LruCache;

use crate::{CacheConfig, ChunkCache, ChunkPos, World, WorldId};

pub struct McaWorld {
    id: WorldId,
    region_dir: PathBuf,
    loader: ChunkLoader,
    cache: Arc<ChunkCache>,
    // None marks regions known not to exist
    regions: Mutex<LruCache<RegionPos, Option<Arc<RegionFile>>>>,
    config: CacheConfig,
    metrics: Option<Arc<RenderMetrics>>,
}

impl McaWorld {
    /// Open the world in `world_dir`, reading chunks from its `region` folder.
    pub fn open(world_dir: &Path, options: LoaderOptions, cache: Arc<ChunkCache>, config: CacheConfig) -> anyhow::Result<Self> {
        let region_dir = world_dir.join("region");
        if !region_dir.is_dir() {
            anyhow::bail!("No region directory in {:?}", world_dir);
        }
        let cap = NonZeroUsize::new(config.region_capacity).unwrap_or(NonZeroUsize::new(100).unwrap());
        log::info!("Opened world {:?} (cache: {} chunks, {} regions)", world_dir, config.capacity, cap);
        Ok(Self {
            id: WorldId::next(),
            region_dir,
            loader: ChunkLoader::new(options),
            cache,
            regions: Mutex::new(LruCache::new(cap)),
            config,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<RenderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn region_dir(&self) -> &Path {
        &self.region_dir
    }

    pub fn loader(&self) -> &ChunkLoader {
        &self.loader
    }

    /// Handle for a region file, `None` if the file does not exist.
    pub fn region(&self, pos: RegionPos) -> Option<Arc<RegionFile>> {
        let mut regions = self.regions.lock().unwrap();
        if let Some(region) = regions.get(&pos) {
            return region.clone();
        }
        let file = RegionFile::in_dir(&self.region_dir, pos);
        let region = file.exists().then(|| Arc::new(file));
        regions.put(pos, region.clone());
        region
    }

    /// Every region file in the region folder.
    pub fn regions(&self) -> anyhow::Result<Vec<RegionPos>> {
        let entries = std::fs::read_dir(&self.region_dir)
            .with_context(|| format!("Failed to list {:?}", self.region_dir))?;
        let mut regions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(pos) = entry.file_name().to_str().and_then(RegionPos::from_filename) {
                regions.push(pos);
            }
        }
        regions.sort_by_key(|p| (p.z, p.x));
        Ok(regions)
    }

    /// Every chunk stored in any region file.
    pub fn present_chunks(&self) -> anyhow::Result<Vec<ChunkPos>> {
        let mut chunks = Vec::new();
        for pos in self.regions()? {
            let Some(region) = self.region(pos) else { continue };
            chunks.extend(region.present_chunks()?.into_iter().map(|(x, z)| ChunkPos::new(x, z)));
        }
        Ok(chunks)
    }

    /// Read and decode a chunk, bypassing the cache.
    ///
    /// Reads are retried; anything that still fails yields an empty chunk.
    pub fn load_chunk(&self, chunk_x: i32, chunk_z: i32) -> Chunk {
        let start = Instant::now();
        let Some(nbt) = self.read_with_retries(chunk_x, chunk_z) else {
            return Chunk::empty();
        };
        match self.loader.load(&nbt) {
            Ok(chunk) => {
                if let Some(metrics) = &self.metrics { metrics.record_load(start.elapsed()); }
                chunk
            }
            Err(e) => {
                log::debug!("Failed to decode chunk ({}, {}): {:?}", chunk_x, chunk_z, e);
                if let Some(metrics) = &self.metrics { metrics.record_load_failure(); }
                Chunk::empty()
            }
        }
    }

    fn read_with_retries(&self, chunk_x: i32, chunk_z: i32) -> Option<Vec<u8>> {
        let Some(region) = self.region(RegionPos::of_chunk(chunk_x, chunk_z)) else {
            if let Some(metrics) = &self.metrics { metrics.record_missing_chunk(); }
            return None;
        };

        let attempts = self.config.load_attempts.max(1);
        for attempt in 1..=attempts {
            match region.read_chunk(chunk_x, chunk_z) {
                Ok(Some(nbt)) => return Some(nbt),
                Ok(None) => {
                    if let Some(metrics) = &self.metrics { metrics.record_missing_chunk(); }
                    return None;
                }
                Err(e) if attempt < attempts => {
                    log::debug!(
                        "Reading chunk ({}, {}) failed (attempt {}/{}): {}. Retrying...",
                        chunk_x, chunk_z, attempt, attempts, e
                    );
                    if let Some(metrics) = &self.metrics { metrics.record_load_retry(); }
                    std::thread::sleep(self.config.retry_interval);
                }
                Err(e) => {
                    log::debug!("Failed to read chunk ({}, {}): {:?}", chunk_x, chunk_z, e);
                    if let Some(metrics) = &self.metrics { metrics.record_load_failure(); }
                }
            }
        }
        None
    }
}

impl World for McaWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn chunk(&self, chunk_x: i32, chunk_z: i32) -> Arc<Chunk> {
        self.cache.get_or_load(self.id, ChunkPos::new(chunk_x, chunk_z), || {
            self.load_chunk(chunk_x, chunk_z)
        })
    }

    fn invalidate_chunk(&self, chunk_x: i32, chunk_z: i32) {
        self.cache.invalidate_chunk(self.id, ChunkPos::new(chunk_x, chunk_z));
    }

    fn invalidate_all(&self) {
        self.cache.invalidate_world(self.id);
        self.regions.lock().unwrap().clear();
    }
}
