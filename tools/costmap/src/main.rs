//! Label raster → traversability cost map.
//!
//! Reads a single-channel PNG of class ids (a generated annotation or an
//! external classifier's mask) and writes the zoned cost heat-map, the
//! occupancy-grid export and, optionally, the raw float grid. The class
//! distribution is printed to stdout as JSON.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dunenet_core::classes::ClassRegistry;
use dunenet_core::costmap::{export_grid, generate_cost_map, CostGridReport, CostMapConfig};
use dunenet_core::grid::ClassGrid;
use dunenet_core::render::colorize;
use dunenet_core::report::{class_distribution, ClassShare};
use serde::Serialize;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "costmap", about = "Convert a class-id label raster into a traversability cost map")]
struct Args {
    /// Single-channel PNG, one class id per pixel
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (created if absent)
    #[arg(short, long, default_value = "costmap_out")]
    output: PathBuf,

    /// JSON class registry (defaults to the built-in 10-class schema)
    #[arg(long)]
    classes: Option<PathBuf>,

    /// JSON file with a CostMapConfig; CLI flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Odd Gaussian kernel size
    #[arg(short, long)]
    kernel: Option<usize>,

    /// Metres per cell in the export
    #[arg(short, long)]
    resolution: Option<f64>,

    /// Also write the raw float cost grid as JSON
    #[arg(long)]
    raw: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<CostMapConfig> {
        let mut cfg = match &self.config {
            Some(path) => serde_json::from_str(&read(path)?)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            None => CostMapConfig::default(),
        };
        if let Some(k) = self.kernel { cfg.blur_kernel = k; }
        if let Some(r) = self.resolution { cfg.resolution = r; }
        Ok(cfg)
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    shape: [usize; 2],
    blur_kernel: usize,
    resolution_m: f64,
    class_distribution: Vec<ClassShare>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn load_mask(path: &Path) -> Result<ClassGrid> {
    let img = image::open(path)
        .with_context(|| format!("Cannot decode {}", path.display()))?
        .to_luma8();
    Ok(ClassGrid::from_luma(&img)?)
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = args.resolve_config()?;
    let registry = match &args.classes {
        Some(path) => ClassRegistry::from_json(&read(path)?)
            .with_context(|| format!("Invalid class registry in {}", path.display()))?,
        None => ClassRegistry::default(),
    };

    let mask = load_mask(&args.input)?;
    log::info!("Loaded {}×{} mask from {}", mask.width, mask.height, args.input.display());

    let (cost, heatmap) = generate_cost_map(&mask, &registry, cfg.blur_kernel)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Cannot create {}", args.output.display()))?;

    let heatmap_path = args.output.join("cost_map.png");
    heatmap
        .save(&heatmap_path)
        .with_context(|| format!("Failed to write {}", heatmap_path.display()))?;
    log::info!("Wrote {}", heatmap_path.display());

    let seg_path = args.output.join("segmentation.png");
    colorize(&mask, &registry)?
        .save(&seg_path)
        .with_context(|| format!("Failed to write {}", seg_path.display()))?;
    log::info!("Wrote {}", seg_path.display());

    write_json(&args.output.join("occupancy_grid.json"), &export_grid(&cost, cfg.resolution))?;
    if args.raw {
        write_json(&args.output.join("cost_grid.json"), &CostGridReport::new(&cost, cfg.resolution))?;
    }

    let summary = Summary {
        input: &args.input,
        shape: [mask.height, mask.width],
        blur_kernel: cfg.blur_kernel,
        resolution_m: cfg.resolution,
        class_distribution: class_distribution(&mask, &registry),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cost_map_config() {
        let args = Args::parse_from(["costmap", "--input", "mask.png"]);
        assert_eq!(args.resolve_config().unwrap(), CostMapConfig::default());
    }

    #[test]
    fn flags_override_kernel_and_resolution() {
        let args = Args::parse_from(["costmap", "-i", "mask.png", "-k", "7", "-r", "0.1"]);
        let cfg = args.resolve_config().unwrap();
        assert_eq!(cfg.blur_kernel, 7);
        assert_eq!(cfg.resolution, 0.1);
    }

    #[test]
    fn mask_png_round_trips_class_ids() {
        let path = std::env::temp_dir().join(format!("dunenet-mask-{}.png", std::process::id()));
        let grid = ClassGrid::from_vec(3, 2, vec![0, 9, 3, 7, 7, 4]).unwrap();
        grid.to_luma().unwrap().save(&path).unwrap();
        assert_eq!(load_mask(&path).unwrap(), grid);
        fs::remove_file(&path).unwrap();
    }
}
