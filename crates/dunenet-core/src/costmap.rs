//! Traversability cost maps: class grid → smoothed cost grid, zoned colour
//! visualisation and occupancy-grid export.
//!
//! Smoothing is what lets a planner perceive proximity risk: cells next to
//! an obstacle carry part of its cost instead of a hard edge.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::classes::ClassRegistry;
use crate::error::{Result, TerrainError};
use crate::grid::{ClassGrid, CostGrid};

// ── Configuration ────────────────────────────────────────────────────────────

/// Cost-map parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostMapConfig {
    /// Odd Gaussian kernel size (cells).
    pub blur_kernel: usize,
    /// Metres per cell in the exported grid.
    pub resolution: f64,
}

impl Default for CostMapConfig {
    fn default() -> Self {
        Self { blur_kernel: 5, resolution: 0.05 }
    }
}

// ── Cost grid ────────────────────────────────────────────────────────────────

/// Raw per-cell registry cost, no smoothing. Unknown ids take the fallback
/// class cost.
pub fn raw_cost_grid(grid: &ClassGrid, registry: &ClassRegistry) -> CostGrid {
    registry.warn_unknown(grid);
    grid.map(|&id| registry.get_or_fallback(id).cost)
}

/// Build the smoothed cost grid: registry lookup, separable Gaussian blur of
/// `kernel_size`, clamp to `[0, 1]`.
pub fn build_cost_grid(grid: &ClassGrid, registry: &ClassRegistry, kernel_size: usize) -> Result<CostGrid> {
    grid.validate()?;
    let kernel = gaussian_kernel(kernel_size)?;
    let raw = raw_cost_grid(grid, registry);
    let mut smoothed = separable_blur(&raw, &kernel);
    for v in &mut smoothed.data {
        *v = v.clamp(0.0, 1.0);
    }
    log::debug!(
        "cost grid {}×{} kernel {kernel_size}: min {:.3} max {:.3}",
        smoothed.width,
        smoothed.height,
        smoothed.min_value(),
        smoothed.max_value()
    );
    Ok(smoothed)
}

/// Binomial weights used for the small kernel sizes 1, 3, 5 and 7.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalised 1D Gaussian weights of odd length `size`.
///
/// Sizes up to 7 use fixed binomial tables. Larger sizes sample a Gaussian
/// with sigma `0.3·((size − 1)/2 − 1) + 0.8`.
pub fn gaussian_kernel(size: usize) -> Result<Vec<f32>> {
    if size == 0 || size % 2 == 0 {
        return Err(TerrainError::InvalidKernel(size));
    }
    if let Some(table) = SMALL_KERNELS.get(size / 2) {
        return Ok(table.to_vec());
    }
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

/// Index into `0..n` with reflect-101 borders (`…2 1 | 0 1 2 … n-1 | n-2…`).
fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize { (period - m) as usize } else { m as usize }
}

/// Horizontal then vertical pass of `kernel` over `src`.
fn separable_blur(src: &CostGrid, kernel: &[f32]) -> CostGrid {
    let (w, h) = (src.width, src.height);
    let half = (kernel.len() / 2) as isize;

    let mut tmp = vec![0.0f32; w * h];
    for r in 0..h {
        let row = &src.data[r * w..(r + 1) * w];
        for c in 0..w {
            tmp[r * w + c] = kernel
                .iter()
                .enumerate()
                .map(|(k, &wt)| wt * row[reflect_101(c as isize + k as isize - half, w)])
                .sum();
        }
    }

    let mut out = vec![0.0f32; w * h];
    for r in 0..h {
        for c in 0..w {
            out[r * w + c] = kernel
                .iter()
                .enumerate()
                .map(|(k, &wt)| wt * tmp[reflect_101(r as isize + k as isize - half, h) * w + c])
                .sum();
        }
    }

    CostGrid { data: out, width: w, height: h }
}

// ── Visualisation ────────────────────────────────────────────────────────────

/// Upper bound of the safe (green) band.
pub const SAFE_LIMIT: f32 = 0.30;
/// Upper bound of the caution (yellow→red) band.
pub const CAUTION_LIMIT: f32 = 0.60;

/// Zoned colour for one cost value: green fading to olive below 0.3, yellow
/// fading to red up to 0.6, solid red beyond.
pub fn cost_color(cost: f32) -> [u8; 3] {
    if cost < SAFE_LIMIT {
        let t = cost / SAFE_LIMIT;
        [(100.0 * t) as u8, (255.0 * (1.0 - t)) as u8, 0]
    } else if cost < CAUTION_LIMIT {
        let t = (cost - SAFE_LIMIT) / (CAUTION_LIMIT - SAFE_LIMIT);
        [255, (255.0 * (1.0 - t)) as u8, 0]
    } else {
        [255, 0, 0]
    }
}

/// Render a cost grid with the zoned ramp, one pixel per cell.
pub fn visualize(cost: &CostGrid) -> RgbImage {
    RgbImage::from_fn(cost.width as u32, cost.height as u32, |x, y| {
        Rgb(cost_color(*cost.get(y as usize, x as usize)))
    })
}

/// Smoothed cost grid plus its visualisation.
pub fn generate_cost_map(
    mask: &ClassGrid,
    registry: &ClassRegistry,
    kernel_size: usize,
) -> Result<(CostGrid, RgbImage)> {
    let cost = build_cost_grid(mask, registry, kernel_size)?;
    let image = visualize(&cost);
    Ok((cost, image))
}

// ── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Point { x: 0.0, y: 0.0, z: 0.0 },
            orientation: Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    pub frame_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    /// Metres per cell.
    pub resolution: f64,
    pub width: usize,
    pub height: usize,
    pub origin: Pose,
}

/// Occupancy-grid record consumed by planners: row-major costs scaled to
/// `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    pub header: GridHeader,
    pub info: GridInfo,
    pub data: Vec<i8>,
}

/// Flatten `cost` row-major, scale by 100 and truncate to `i8`.
pub fn export_grid(cost: &CostGrid, resolution: f64) -> OccupancyGrid {
    let data = cost.data.iter().map(|&v| (v * 100.0) as i8).collect();
    OccupancyGrid {
        header: GridHeader { frame_id: "map".to_string() },
        info: GridInfo {
            resolution,
            width: cost.width,
            height: cost.height,
            origin: Pose::identity(),
        },
        data,
    }
}

/// Raw cost rows plus shape, for consumers that want floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGridReport {
    pub cost_grid: Vec<Vec<f32>>,
    /// `[height, width]`.
    pub shape: [usize; 2],
    pub resolution_m: f64,
}

impl CostGridReport {
    pub fn new(cost: &CostGrid, resolution: f64) -> Self {
        Self {
            cost_grid: cost.rows().map(<[f32]>::to_vec).collect(),
            shape: [cost.height, cost.width],
            resolution_m: resolution,
        }
    }
}
