//! Per-class height synthesis for terrain previews.
//!
//! `height = base[class] + variance[class] · u`, where `u` is a uniform
//! `[0, 1)` field seeded independently of the classification noise.

use crate::classes::{ClassId, FALLBACK_CLASS};
use crate::error::Result;
use crate::grid::{ClassGrid, HeightGrid};
use crate::noise::uniform_field;

/// Base height per class id.
pub const BASE: [f32; 10] = [0.55, 0.35, 0.22, 0.08, 0.18, 0.02, 0.12, -0.25, 0.28, 0.80];
/// Noise-modulated height range per class id.
pub const VARIANCE: [f32; 10] = [0.50, 0.20, 0.12, 0.08, 0.15, 0.04, 0.06, 0.05, 0.12, 0.40];

/// Height of a cell of class `id` for noise value `u`.
///
/// Ids beyond the table use the fallback class.
#[inline]
pub fn height_for(id: ClassId, u: f32) -> f32 {
    let i = if (id as usize) < BASE.len() { id as usize } else { FALLBACK_CLASS as usize };
    BASE[i] + VARIANCE[i] * u
}

/// Height grid for `grid`, with the modulation field seeded by `seed`.
pub fn height_field(grid: &ClassGrid, seed: u64) -> Result<HeightGrid> {
    grid.validate()?;
    let u = uniform_field(grid.width, grid.height, seed)?;
    let data = grid.data.iter().zip(&u.data).map(|(&id, &u)| height_for(id, u as f32)).collect();
    HeightGrid::from_vec(grid.width, grid.height, data)
}
