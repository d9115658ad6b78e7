use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;

use hires_anvil::LoaderOptions;
use hires_metrics::RenderMetrics;
use hires_model::{TileFormat, TileModel, TileModelPool};
use hires_render::{CubeRenderer, HiresRenderer, RenderSettings};
use hires_world::{CacheConfig, ChunkCache, McaWorld, World};

mod output;

use output::{TileGrid, tile_path, write_atomic};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Compact binary tiles
    Prbm,
    /// BufferGeometry JSON tiles
    Json,
}

impl From<OutputFormat> for TileFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Prbm => TileFormat::Prbm,
            OutputFormat::Json => TileFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "hires", about = "Renders Minecraft Anvil worlds into hires tile models")]
pub struct Args {
    /// World folder containing a `region` directory
    #[arg(short, long, env = "HIRES_WORLD")]
    pub world: PathBuf,

    #[arg(short, long, default_value = "tiles")]
    pub out: PathBuf,

    #[arg(short, long, value_enum, default_value = "prbm")]
    pub format: OutputFormat,

    #[arg(long, allow_negative_numbers = true)]
    pub min_x: i32,
    #[arg(long, allow_negative_numbers = true)]
    pub max_x: i32,
    #[arg(long, allow_negative_numbers = true)]
    pub min_z: i32,
    #[arg(long, allow_negative_numbers = true)]
    pub max_z: i32,
    #[arg(long, allow_negative_numbers = true)]
    pub min_y: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    pub max_y: Option<i32>,

    /// Tile edge length in blocks
    #[arg(long, default_value = "32")]
    pub tile_size: i32,

    /// Decoded chunks kept in memory
    #[arg(long, env = "HIRES_CACHE_SIZE", default_value = "500")]
    pub cache_size: usize,

    /// Render chunks that have no light data yet
    #[arg(long, env = "HIRES_IGNORE_MISSING_LIGHT")]
    pub ignore_missing_light: bool,

    /// Sky light assumed where a chunk has no light data
    #[arg(long, default_value = "15")]
    pub sky_light: u8,

    /// Stop each column at the first opaque block
    #[arg(long)]
    pub top_only: bool,

    /// Gzip tile files
    #[arg(long)]
    pub gzip: bool,

    /// Render threads (defaults to the number of CPUs)
    #[arg(long)]
    pub threads: Option<usize>,
}

struct Job {
    world: Box<dyn World>,
    renderer: HiresRenderer<CubeRenderer>,
    pool: TileModelPool,
    grid: TileGrid,
    format: TileFormat,
    out: PathBuf,
    gzip: bool,
    metrics: Arc<RenderMetrics>,
}

impl Job {
    /// Render, sort and write one tile. Returns false if the tile was empty.
    ///
    /// The tile model goes back to the pool whether or not writing succeeded.
    fn render_tile(&self, tile: (i32, i32)) -> anyhow::Result<bool> {
        let mut model = self.pool.acquire();
        let result = self.render_into(tile, &mut model);
        self.pool.release(model);
        result
    }

    fn render_into(&self, tile: (i32, i32), model: &mut TileModel) -> anyhow::Result<bool> {
        let ((min_x, min_z), (max_x, max_z)) = self.grid.bounds(tile);
        let meta = self.renderer.render(
            self.world.as_ref(),
            [min_x, i32::MIN, min_z],
            [max_x, i32::MAX, max_z],
            model,
        );
        if model.is_empty() {
            return Ok(false);
        }

        let start = Instant::now();
        model.sort();
        self.metrics.record_sort(start.elapsed());

        let start = Instant::now();
        let path = tile_path(&self.out, tile, self.format.extension(), self.gzip);
        let format = self.format;
        let bytes = write_atomic(&path, self.gzip, |out| format.encode(model, out))?;
        self.metrics.record_encode(start.elapsed(), bytes);

        let meta_path = self.out.join(format!("x{}z{}.meta.json", tile.0, tile.1));
        write_atomic(&meta_path, false, |out| {
            let json = serde_json::to_vec(&meta.to_json())?;
            out.write_all(&json)?;
            Ok(json.len() as u64)
        })?;

        log::info!("Tile ({}, {}): {} faces, {} bytes -> {:?}", tile.0, tile.1, model.size(), bytes, path);
        Ok(true)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure render threads")?;
    }

    let grid = TileGrid::new(args.tile_size, (args.min_x, args.min_z), (args.max_x, args.max_z))?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {:?}", args.out))?;

    let metrics = Arc::new(RenderMetrics::new());
    let config = CacheConfig {
        capacity: args.cache_size,
        ..CacheConfig::default()
    };
    let cache = Arc::new(ChunkCache::from_config(&config).with_metrics(metrics.clone()));
    let options = LoaderOptions {
        ignore_missing_light_data: args.ignore_missing_light,
        ambient_sky_light: args.sky_light.min(15),
    };
    let world = McaWorld::open(&args.world, options, cache, config)?.with_metrics(metrics.clone());

    let settings = RenderSettings {
        min: [args.min_x, args.min_y.unwrap_or(i32::MIN), args.min_z],
        max: [args.max_x, args.max_y.unwrap_or(i32::MAX), args.max_z],
        render_top_only: args.top_only,
    };
    let job = Job {
        world: Box::new(world),
        renderer: HiresRenderer::new(CubeRenderer::new(), settings).with_metrics(metrics.clone()),
        pool: TileModelPool::default(),
        grid,
        format: args.format.into(),
        out: args.out.clone(),
        gzip: args.gzip,
        metrics: metrics.clone(),
    };

    let tiles = grid.tiles();
    println!("Rendering {} tiles from {:?} into {:?}", tiles.len(), args.world, args.out);

    let written = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    tiles.par_iter().for_each(|&tile| match job.render_tile(tile) {
        Ok(true) => {
            written.fetch_add(1, Ordering::Relaxed);
        }
        Ok(false) => log::debug!("Tile ({}, {}) is empty", tile.0, tile.1),
        Err(e) => {
            failed.fetch_add(1, Ordering::Relaxed);
            log::error!("Failed to write tile ({}, {}): {:#}", tile.0, tile.1, e);
        }
    });

    let materials = job.renderer.block_renderer().materials();
    let materials_path = args.out.join("materials.json");
    std::fs::write(&materials_path, serde_json::to_vec_pretty(&materials)?)
        .with_context(|| format!("Failed to write {:?}", materials_path))?;

    println!(
        "Wrote {} tiles ({} failed, {} empty)",
        written.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        tiles.len() - written.load(Ordering::Relaxed) - failed.load(Ordering::Relaxed)
    );
    println!("{}", metrics.generate_report());
    for (cause, dropped) in hires_anvil::log_once::suppressed_counts() {
        log::warn!("{}: {} more occurrences were not logged", cause, dropped);
    }

    if failed.load(Ordering::Relaxed) > 0 {
        anyhow::bail!("{} tiles could not be written", failed.load(Ordering::Relaxed));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use fastnbt::{LongArray, Value};
    use hires_anvil::ChunkLoader;
    use hires_anvil::packed::pack_aligned;
    use hires_world::MemoryWorld;

    fn compound(entries: Vec<(&str, Value)>) -> Value {
        Value::Compound(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// World with a single stone block at the origin.
    fn stone_world() -> MemoryWorld {
        let mut indices = vec![0u64; 4096];
        indices[0] = 1;
        let palette = ["minecraft:air", "minecraft:stone"]
            .iter()
            .map(|name| compound(vec![("Name", Value::String(name.to_string()))]))
            .collect();
        let section = compound(vec![
            ("Y", Value::Byte(0)),
            (
                "block_states",
                compound(vec![
                    ("palette", Value::List(palette)),
                    ("data", Value::LongArray(LongArray::new(pack_aligned(&indices, 4)))),
                ]),
            ),
        ]);
        let root = compound(vec![
            ("DataVersion", Value::Int(3465)),
            ("Status", Value::String("minecraft:full".into())),
            ("isLightOn", Value::Byte(1)),
            ("yPos", Value::Int(0)),
            ("sections", Value::List(vec![section])),
        ]);
        let world = MemoryWorld::new();
        world
            .insert_nbt(0, 0, &ChunkLoader::default(), &fastnbt::to_bytes(&root).unwrap())
            .unwrap();
        world
    }

    fn job(out: PathBuf) -> Job {
        let metrics = Arc::new(RenderMetrics::new());
        Job {
            world: Box::new(stone_world()),
            renderer: HiresRenderer::new(CubeRenderer::new(), RenderSettings::default()),
            pool: TileModelPool::new(16, 4),
            grid: TileGrid::new(16, (0, 0), (15, 15)).unwrap(),
            format: TileFormat::Prbm,
            out,
            gzip: false,
            metrics,
        }
    }

    #[test]
    fn test_tile_written_and_model_returned() {
        let out = std::env::temp_dir().join(format!("hires-main-ok-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&out);
        std::fs::create_dir_all(&out).unwrap();
        let job = job(out.clone());

        assert!(job.render_tile((0, 0)).unwrap());
        assert!(out.join("x0z0.prbm").is_file());
        assert!(out.join("x0z0.meta.json").is_file());
        assert_eq!(job.pool.available(), 1);

        assert!(!job.render_tile((5, 5)).unwrap());
        assert_eq!(job.pool.available(), 1);
        std::fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn test_failed_write_returns_model_to_pool() {
        let out = std::env::temp_dir().join(format!("hires-main-missing-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&out);
        let job = job(out.clone());

        assert!(job.render_tile((0, 0)).is_err());
        assert_eq!(job.pool.available(), 1);
        assert!(!out.exists());
    }
}
