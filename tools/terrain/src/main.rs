//! Terrain preset report: `(preset, grid, seed)` → per-cell class, cost and
//! height JSON, with optional preview images.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dunenet_core::classes::ClassRegistry;
use dunenet_core::costmap::{generate_cost_map, CostMapConfig};
use dunenet_core::grid::HeightGrid;
use dunenet_core::render::colorize;
use dunenet_core::report::{synthesize_terrain, Terrain, TerrainReport};
use dunenet_core::terrain::Style;
use image::{GrayImage, Luma};

#[derive(Parser, Debug)]
#[command(name = "terrain", about = "Synthesise a terrain preset and report it per cell")]
struct Args {
    /// desert | rocky | mixed | composite (unknown names fall back to mixed)
    #[arg(short, long, default_value = "mixed")]
    preset: String,

    /// Grid size
    #[arg(short, long, default_value = "48")]
    grid: usize,

    /// Seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for segmentation, cost and height preview PNGs
    #[arg(long)]
    preview: Option<PathBuf>,
}

/// Height grid → grayscale, normalised to the grid's own range.
fn height_image(heights: &HeightGrid) -> GrayImage {
    let lo = heights.min_value();
    let range = (heights.max_value() - lo).max(f32::EPSILON);
    GrayImage::from_fn(heights.width as u32, heights.height as u32, |x, y| {
        let v = (heights.get(y as usize, x as usize) - lo) / range;
        Luma([(v * 255.0) as u8])
    })
}

fn write_previews(dir: &Path, terrain: &Terrain, registry: &ClassRegistry) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let (_, heatmap) = generate_cost_map(&terrain.classes, registry, CostMapConfig::default().blur_kernel)?;

    let seg = dir.join("segmentation.png");
    colorize(&terrain.classes, registry)?
        .save(&seg)
        .with_context(|| format!("Failed to write {}", seg.display()))?;
    let heatmap_path = dir.join("cost_map.png");
    heatmap
        .save(&heatmap_path)
        .with_context(|| format!("Failed to write {}", heatmap_path.display()))?;
    let height_path = dir.join("heights.png");
    height_image(&terrain.heights)
        .save(&height_path)
        .with_context(|| format!("Failed to write {}", height_path.display()))?;

    log::info!("Wrote previews to {}", dir.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let registry = ClassRegistry::default();
    let style = Style::from_preset(&args.preset);
    let terrain = synthesize_terrain(style, args.grid, args.seed)
        .with_context(|| format!("Cannot synthesise {style} terrain of size {}", args.grid))?;
    log::info!("Synthesised {style} terrain {}×{} seed {}", args.grid, args.grid, args.seed);

    if let Some(dir) = &args.preview {
        write_previews(dir, &terrain, &registry)?;
    }

    let json = serde_json::to_string(&TerrainReport::new(&terrain, &registry))?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
