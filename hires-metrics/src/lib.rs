use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct RenderMetrics {
    // Chunk Loading
    pub total_chunks_loaded: AtomicUsize,
    pub total_load_time_us: AtomicU64,
    pub max_load_time_us: AtomicU64,
    pub total_load_retries: AtomicUsize,
    pub total_load_failures: AtomicUsize,
    pub total_chunks_missing: AtomicUsize,

    // Cache
    pub total_cache_hits: AtomicUsize,
    pub total_cache_misses: AtomicUsize,

    // Tiles
    pub total_tiles_rendered: AtomicUsize,
    pub total_render_time_us: AtomicU64,
    pub max_render_time_us: AtomicU64,
    pub total_faces: AtomicUsize,
    pub total_block_failures: AtomicUsize,

    // Output
    pub total_sort_us: AtomicU64,
    pub total_encode_us: AtomicU64,
    pub total_bytes_written: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_load(&self, duration: Duration) {
        self.total_chunks_loaded.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_load_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_load_time_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_load_retry(&self) {
        self.total_load_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.total_load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Chunk absent from its region (never generated).
    pub fn record_missing_chunk(&self) {
        self.total_chunks_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.total_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.total_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile(&self, duration: Duration, faces: usize) {
        self.total_tiles_rendered.fetch_add(1, Ordering::Relaxed);
        self.total_faces.fetch_add(faces, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_render_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_render_time_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_block_failure(&self) {
        self.total_block_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sort(&self, duration: Duration) {
        self.total_sort_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_encode(&self, duration: Duration, bytes: u64) {
        self.total_encode_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.total_cache_hits.load(Ordering::Relaxed);
        let misses = self.total_cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total > 0 { (hits as f64 / total as f64) * 100.0 } else { 0.0 }
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();

        let loaded = self.total_chunks_loaded.load(Ordering::Relaxed);
        let load_time = self.total_load_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let load_max = self.max_load_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let load_avg = if loaded > 0 { load_time / loaded as f64 } else { 0.0 };
        let retries = self.total_load_retries.load(Ordering::Relaxed);
        let failures = self.total_load_failures.load(Ordering::Relaxed);
        let missing = self.total_chunks_missing.load(Ordering::Relaxed);

        let hits = self.total_cache_hits.load(Ordering::Relaxed);
        let misses = self.total_cache_misses.load(Ordering::Relaxed);

        let tiles = self.total_tiles_rendered.load(Ordering::Relaxed);
        let render_time = self.total_render_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let render_max = self.max_render_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let render_avg = if tiles > 0 { render_time / tiles as f64 } else { 0.0 };
        let faces = self.total_faces.load(Ordering::Relaxed);
        let block_failures = self.total_block_failures.load(Ordering::Relaxed);

        let sort_time = self.total_sort_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let encode_time = self.total_encode_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let sort_avg = if tiles > 0 { sort_time / tiles as f64 } else { 0.0 };
        let encode_avg = if tiles > 0 { encode_time / tiles as f64 } else { 0.0 };
        let bytes = self.total_bytes_written.load(Ordering::Relaxed);

        format!(
            "Hires Render Report\n\
             ===================\n\
             Session Duration: {:.2?}\n\n\
             [Chunks]\n\
             Chunks Loaded: {}\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\
             Not Generated: {}\n\
             Retries: {}\n\
             Failures: {}\n\n\
             [Cache]\n\
             Hits: {}\n\
             Misses: {}\n\
             Hit Rate: {:.1}%\n\n\
             [Tiles]\n\
             Tiles Rendered: {}\n\
             Avg Time: {:.2} ms/tile\n\
             Max Time: {:.2} ms\n\
             Faces: {}\n\
             Failed Blocks: {}\n\n\
             [Output]\n\
               - Sort: {:.2} ms/tile\n\
               - Encode: {:.2} ms/tile\n\
             Bytes Written: {}\n",
            uptime,
            loaded, load_avg, load_max, missing, retries, failures,
            hits, misses, self.cache_hit_rate(),
            tiles, render_avg, render_max, faces, block_failures,
            sort_avg, encode_avg, bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let metrics = RenderMetrics::new();
        assert_eq!(metrics.cache_hit_rate(), 0.0);
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert_eq!(metrics.cache_hit_rate(), 75.0);
    }

    #[test]
    fn test_report_counts() {
        let metrics = RenderMetrics::new();
        metrics.record_load(Duration::from_millis(4));
        metrics.record_load(Duration::from_millis(2));
        metrics.record_tile(Duration::from_millis(10), 120);
        metrics.record_encode(Duration::from_millis(1), 2048);

        assert_eq!(metrics.max_load_time_us.load(Ordering::Relaxed), 4000);
        let report = metrics.generate_report();
        assert!(report.contains("Chunks Loaded: 2"));
        assert!(report.contains("Avg Time: 3.00 ms/chunk"));
        assert!(report.contains("Faces: 120"));
        assert!(report.contains("Bytes Written: 2048"));
    }
}
