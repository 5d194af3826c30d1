//! Training-sample synthesis: seed planning, rendering and augmentation.
//!
//! Each sample is a pure function of its own seed, so samples can be
//! generated in any order or in parallel and still come out identical.
//! Writing them to disk is left to the caller.

use std::fmt;

use image::{GrayImage, RgbImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::augment::augment;
use crate::classes::ClassRegistry;
use crate::error::{Result, TerrainError};
use crate::render::{render_pair, RenderOptions};
use crate::terrain::{generate, Style};

/// Upper bound (exclusive) for per-sample seeds.
pub const SAMPLE_SEED_LIMIT: u64 = 1 << 31;

const RENDER_SALT: u64 = 0x5EED_0F_C0_10_25;
const AUGMENT_SALT: u64 = 0xA0_6E_17_00;

/// Dataset generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Total number of samples across both splits.
    pub n: usize,
    /// Side length of the synthesised class grid.
    pub grid: usize,
    /// Side length of the rendered rasters.
    pub img_size: u32,
    /// Fraction of samples held out for validation.
    pub val_split: f32,
    /// Master seed for per-sample seed planning.
    pub seed: u64,
    /// Augment training samples.
    pub augment: bool,
    pub jitter_std: f32,
    pub blur_sigma: f32,
    pub style: Style,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            n: 1000,
            grid: 64,
            img_size: 512,
            val_split: 0.15,
            seed: 42,
            augment: true,
            jitter_std: 8.0,
            blur_sigma: 0.8,
            style: Style::Composite,
        }
    }
}

impl DatasetConfig {
    /// Number of validation samples: `max(1, floor(n · val_split))`.
    pub fn n_val(&self) -> usize {
        ((self.n as f64 * self.val_split as f64).floor() as usize).max(1)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            output_size: self.img_size,
            jitter_std: self.jitter_std,
            blur_sigma: self.blur_sigma,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(TerrainError::InvalidConfig("sample count must be positive".into()));
        }
        if self.grid == 0 {
            return Err(TerrainError::EmptyGrid { width: 0, height: 0 });
        }
        if !(0.0..1.0).contains(&self.val_split) {
            return Err(TerrainError::InvalidConfig(format!(
                "val_split {} outside [0, 1)",
                self.val_split
            )));
        }
        Ok(())
    }

    /// Check `registry` knows every class id the configured style can emit.
    pub fn check_registry(&self, registry: &ClassRegistry) -> Result<()> {
        let missing: Vec<_> = self.style.class_ids().into_iter().filter(|&id| !registry.contains(id)).collect();
        if !missing.is_empty() {
            return Err(TerrainError::InvalidRegistry(format!(
                "style {} emits class ids {missing:?} missing from the registry",
                self.style
            )));
        }
        Ok(())
    }
}

/// Dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one sample goes and which seed produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    pub index: usize,
    pub split: Split,
    pub seed: u64,
}

impl SamplePlan {
    /// File stem shared by the image and its annotation.
    pub fn stem(&self) -> String {
        format!("{:06}", self.index)
    }
}

/// Plan every sample: training samples first, then validation, each with a
/// seed in `[0, 2^31)` drawn from the master seed.
pub fn plan(config: &DatasetConfig) -> Vec<SamplePlan> {
    let n = config.n;
    let n_val = config.n_val().min(n);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    (0..n)
        .map(|index| SamplePlan {
            index,
            split: if index < n - n_val { Split::Train } else { Split::Val },
            seed: rng.gen_range(0..SAMPLE_SEED_LIMIT),
        })
        .collect()
}

/// One finished training pair.
#[derive(Debug, Clone)]
pub struct Sample {
    pub plan: SamplePlan,
    pub image: RgbImage,
    pub label: GrayImage,
}

/// Synthesise, render and (for training samples) augment one sample.
pub fn generate_sample(plan: SamplePlan, config: &DatasetConfig, registry: &ClassRegistry) -> Result<Sample> {
    let grid = generate(config.style, config.grid, plan.seed)?;
    let mut render_rng = ChaCha8Rng::seed_from_u64(plan.seed ^ RENDER_SALT);
    let pair = render_pair(&grid, registry, &config.render_options(), &mut render_rng)?;

    let (image, label) = if config.augment && plan.split == Split::Train {
        let mut aug_rng = ChaCha8Rng::seed_from_u64(plan.seed ^ AUGMENT_SALT);
        augment(&pair.image, &pair.label, &mut aug_rng)?
    } else {
        (pair.image, pair.label)
    };
    Ok(Sample { plan, image, label })
}

/// Generate every planned sample, in plan order.
#[cfg(not(feature = "threading"))]
pub fn generate_all(config: &DatasetConfig, registry: &ClassRegistry) -> Result<Vec<Sample>> {
    config.validate()?;
    config.check_registry(registry)?;
    plan(config)
        .into_iter()
        .map(|p| generate_sample(p, config, registry))
        .collect()
}

/// Generate every planned sample across the rayon pool, in plan order.
#[cfg(feature = "threading")]
pub fn generate_all(config: &DatasetConfig, registry: &ClassRegistry) -> Result<Vec<Sample>> {
    use rayon::prelude::*;
    config.validate()?;
    config.check_registry(registry)?;
    plan(config)
        .into_par_iter()
        .map(|p| generate_sample(p, config, registry))
        .collect()
}
