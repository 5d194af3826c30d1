//! Summaries handed to outer consumers: class distributions and per-cell
//! terrain reports.

use serde::{Deserialize, Serialize};

use crate::classes::{ClassRegistry, TerrainClass};
use crate::error::Result;
use crate::grid::{ClassGrid, HeightGrid};
use crate::height::height_field;
use crate::terrain::{generate, Style};

/// Classes covering at most this fraction are left out of distributions.
pub const MIN_SHARE: f32 = 0.01;

/// Side length of the world a terrain report covers, in metres.
pub const WORLD_SIZE: u32 = 20;

fn round3(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

/// Fraction of a grid covered by one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub name: String,
    /// Coverage fraction rounded to 3 decimals.
    pub conf: f32,
    pub color: String,
}

/// Per-class coverage above 1%, largest first.
pub fn class_distribution(grid: &ClassGrid, registry: &ClassRegistry) -> Vec<ClassShare> {
    let total = grid.len() as f32;
    let mut shares: Vec<ClassShare> = registry
        .classes()
        .iter()
        .filter_map(|class| {
            let frac = grid.count(class.id) as f32 / total;
            (frac > MIN_SHARE).then(|| ClassShare {
                name: class.name.clone(),
                conf: round3(frac),
                color: class.hex(),
            })
        })
        .collect();
    shares.sort_by(|a, b| b.conf.total_cmp(&a.conf));
    shares
}

/// Class grid and height grid synthesised from one seed.
#[derive(Debug, Clone)]
pub struct Terrain {
    pub style: Style,
    pub seed: u64,
    pub classes: ClassGrid,
    pub heights: HeightGrid,
}

/// `(style, size, seed) → (class grid, height grid)`.
///
/// Both grids reuse the same seed: one for the classification noise, one
/// for an independent height modulation field.
pub fn synthesize_terrain(style: Style, size: usize, seed: u64) -> Result<Terrain> {
    let classes = generate(style, size, seed)?;
    let heights = height_field(&classes, seed)?;
    Ok(Terrain { style, seed, classes, heights })
}

/// One cell of a terrain report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainCell {
    pub class_id: u8,
    pub class_name: String,
    pub cost: f32,
    pub traversable: bool,
    /// Rounded to 3 decimals.
    pub height: f32,
    pub color: String,
}

/// Full per-cell terrain record, indexed `cells[row][col]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainReport {
    pub preset: String,
    pub grid: usize,
    pub seed: u64,
    pub world_size: u32,
    pub num_classes: usize,
    pub classes: Vec<TerrainClass>,
    pub cells: Vec<Vec<TerrainCell>>,
}

impl TerrainReport {
    pub fn new(terrain: &Terrain, registry: &ClassRegistry) -> Self {
        registry.warn_unknown(&terrain.classes);
        let cells = terrain
            .classes
            .rows()
            .zip(terrain.heights.rows())
            .map(|(ids, heights)| {
                ids.iter()
                    .zip(heights)
                    .map(|(&id, &h)| {
                        let class = registry.get_or_fallback(id);
                        TerrainCell {
                            class_id: id,
                            class_name: class.name.clone(),
                            cost: class.cost,
                            traversable: class.traversable,
                            height: round3(h),
                            color: class.hex(),
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            preset: terrain.style.to_string(),
            grid: terrain.classes.width,
            seed: terrain.seed,
            world_size: WORLD_SIZE,
            num_classes: registry.len(),
            classes: registry.classes().to_vec(),
            cells,
        }
    }
}
