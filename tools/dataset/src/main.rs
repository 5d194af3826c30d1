//! Synthetic terrain dataset writer.
//!
//! Layout under `--out`:
//!   images/{train,val}/NNNNNN.png        RGB renders
//!   annotations/{train,val}/NNNNNN.png   single-channel class ids
//!   class_info.json                      class registry
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use dunenet_core::classes::ClassRegistry;
use dunenet_core::dataset::{generate_sample, plan, DatasetConfig, Sample, Split};
use dunenet_core::terrain::Style;
use rayon::prelude::*;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dataset", about = "Generate a synthetic terrain segmentation dataset")]
struct Args {
    /// Output directory (created if absent)
    #[arg(short, long, default_value = "./terrain_dataset")]
    out: PathBuf,

    /// JSON file with a DatasetConfig; CLI flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON class registry (defaults to the built-in 10-class schema)
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Total samples
    #[arg(short, long)]
    n: Option<usize>,

    /// Terrain grid size
    #[arg(long)]
    grid: Option<usize>,

    /// Output image size
    #[arg(long)]
    size: Option<u32>,

    /// Master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Validation fraction
    #[arg(long)]
    val_split: Option<f32>,

    /// desert | rocky | mixed | composite
    #[arg(long)]
    style: Option<Style>,

    /// Disable augmentation of training samples
    #[arg(long)]
    no_aug: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<DatasetConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Cannot read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => DatasetConfig::default(),
        };
        if let Some(n) = self.n { cfg.n = n; }
        if let Some(grid) = self.grid { cfg.grid = grid; }
        if let Some(size) = self.size { cfg.img_size = size; }
        if let Some(seed) = self.seed { cfg.seed = seed; }
        if let Some(val_split) = self.val_split { cfg.val_split = val_split; }
        if let Some(style) = self.style { cfg.style = style; }
        if self.no_aug { cfg.augment = false; }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn load_registry(path: Option<&Path>) -> Result<ClassRegistry> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            ClassRegistry::from_json(&text)
                .with_context(|| format!("Invalid class registry in {}", path.display()))
        }
        None => Ok(ClassRegistry::default()),
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

fn create_layout(out: &Path) -> Result<()> {
    for split in [Split::Train, Split::Val] {
        for dir in ["images", "annotations"] {
            let path = out.join(dir).join(split.as_str());
            fs::create_dir_all(&path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
        }
    }
    Ok(())
}

fn write_sample(out: &Path, sample: &Sample) -> Result<()> {
    let split = sample.plan.split.as_str();
    let name = format!("{}.png", sample.plan.stem());

    let image_path = out.join("images").join(split).join(&name);
    sample
        .image
        .save(&image_path)
        .with_context(|| format!("Failed to write {}", image_path.display()))?;

    let label_path = out.join("annotations").join(split).join(&name);
    sample
        .label
        .save(&label_path)
        .with_context(|| format!("Failed to write {}", label_path.display()))?;
    Ok(())
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = args.resolve_config()?;
    let registry = load_registry(args.classes.as_deref())?;
    cfg.check_registry(&registry)?;
    create_layout(&args.out)?;

    let samples = plan(&cfg);
    let n_val = samples.iter().filter(|s| s.split == Split::Val).count();
    log::info!(
        "Generating {} samples ({} train, {n_val} val) at {}×{} from {}×{} grids",
        samples.len(),
        samples.len() - n_val,
        cfg.img_size,
        cfg.img_size,
        cfg.grid,
        cfg.grid,
    );

    let done = AtomicUsize::new(0);
    samples.par_iter().try_for_each(|&p| -> Result<()> {
        let sample = generate_sample(p, &cfg, &registry)
            .with_context(|| format!("Sample {} (seed {}) failed", p.index, p.seed))?;
        write_sample(&args.out, &sample)?;
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 100 == 0 {
            log::info!("  {n}/{}", samples.len());
        }
        Ok(())
    })?;

    let info_path = args.out.join("class_info.json");
    fs::write(&info_path, serde_json::to_string_pretty(&registry)?)
        .with_context(|| format!("Failed to write {}", info_path.display()))?;

    log::info!("Dataset saved to {}", args.out.display());
    Ok(())
}
