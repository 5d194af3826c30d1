//! Class grid → colour raster, plus a pixel-aligned label raster.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::classes::ClassRegistry;
use crate::error::{Result, TerrainError};
use crate::grid::ClassGrid;

/// Renderer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Side length of the square output rasters.
    pub output_size: u32,
    /// Std-dev of per-pixel Gaussian colour jitter, in byte units.
    pub jitter_std: f32,
    /// Gaussian blur sigma applied before resizing; `0` disables it.
    pub blur_sigma: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { output_size: 512, jitter_std: 8.0, blur_sigma: 0.8 }
    }
}

impl RenderOptions {
    fn validate(&self) -> Result<()> {
        if self.output_size == 0 {
            return Err(TerrainError::InvalidRender("output size must be positive".into()));
        }
        if !(self.jitter_std >= 0.0 && self.jitter_std.is_finite()) {
            return Err(TerrainError::InvalidRender(format!("jitter std {}", self.jitter_std)));
        }
        if !(self.blur_sigma >= 0.0 && self.blur_sigma.is_finite()) {
            return Err(TerrainError::InvalidRender(format!("blur sigma {}", self.blur_sigma)));
        }
        Ok(())
    }
}

/// Rendered image and its label raster, same dimensions.
#[derive(Debug, Clone)]
pub struct RasterPair {
    pub image: RgbImage,
    pub label: GrayImage,
}

/// Paint each cell with its registry colour, one pixel per cell.
///
/// Unknown ids use the fallback class colour.
pub fn colorize(grid: &ClassGrid, registry: &ClassRegistry) -> Result<RgbImage> {
    grid.validate()?;
    registry.warn_unknown(grid);
    Ok(RgbImage::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        Rgb(registry.get_or_fallback(*grid.get(y as usize, x as usize)).color)
    }))
}

/// Render `grid` to an `output_size²` colour raster.
///
/// Each pixel gets its class colour plus independent Gaussian jitter per
/// channel, then the raster is softened with a small blur and resized
/// bilinearly.
pub fn render<R: Rng + ?Sized>(
    grid: &ClassGrid,
    registry: &ClassRegistry,
    opts: &RenderOptions,
    rng: &mut R,
) -> Result<RgbImage> {
    grid.validate()?;
    opts.validate()?;
    registry.warn_unknown(grid);
    let jitter = Normal::new(0.0f32, opts.jitter_std)
        .map_err(|e| TerrainError::InvalidRender(e.to_string()))?;

    let mut img = RgbImage::new(grid.width as u32, grid.height as u32);
    for (cell, px) in grid.data.iter().zip(img.pixels_mut()) {
        let base = registry.get_or_fallback(*cell).color;
        for (ch, &b) in px.0.iter_mut().zip(base.iter()) {
            *ch = (b as f32 + jitter.sample(rng)).clamp(0.0, 255.0) as u8;
        }
    }

    if opts.blur_sigma > 0.0 {
        img = imageops::blur(&img, opts.blur_sigma);
    }
    if img.dimensions() != (opts.output_size, opts.output_size) {
        img = imageops::resize(&img, opts.output_size, opts.output_size, FilterType::Triangle);
    }
    Ok(img)
}

/// Nearest-neighbour resize of the class grid to `size²`.
///
/// Ids are never interpolated: every output value occurs in the input.
pub fn resize_labels(grid: &ClassGrid, size: u32) -> Result<GrayImage> {
    grid.validate()?;
    if size == 0 {
        return Err(TerrainError::InvalidRender("output size must be positive".into()));
    }
    let label = grid.to_luma().ok_or(TerrainError::DataLength {
        width: grid.width,
        height: grid.height,
        actual: grid.data.len(),
    })?;
    if label.dimensions() == (size, size) {
        return Ok(label);
    }
    Ok(imageops::resize(&label, size, size, FilterType::Nearest))
}

/// Render the colour raster and its aligned label raster.
pub fn render_pair<R: Rng + ?Sized>(
    grid: &ClassGrid,
    registry: &ClassRegistry,
    opts: &RenderOptions,
    rng: &mut R,
) -> Result<RasterPair> {
    let image = render(grid, registry, opts, rng)?;
    let label = resize_labels(grid, opts.output_size)?;
    Ok(RasterPair { image, label })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::{OBSTACLE, SAND, WATER};
    use crate::grid::Grid;
    use crate::terrain::{generate, Style};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    fn crisp(size: u32) -> RenderOptions {
        RenderOptions { output_size: size, jitter_std: 0.0, blur_sigma: 0.0 }
    }

    #[test]
    fn no_jitter_no_blur_reproduces_registry_colours() {
        let reg = ClassRegistry::default();
        let grid = ClassGrid::from_vec(2, 1, vec![WATER, OBSTACLE]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let img = render(&grid, &reg, &crisp(2), &mut rng).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, reg.get(WATER).unwrap().color);
        assert_eq!(img.get_pixel(1, 0).0, reg.get(OBSTACLE).unwrap().color);
        assert_eq!(img, colorize(&grid, &reg).unwrap());
    }

    #[test]
    fn render_is_deterministic_for_a_seeded_rng() {
        let reg = ClassRegistry::default();
        let grid = generate(Style::Desert, 32, 5).unwrap();
        let opts = RenderOptions { output_size: 64, ..RenderOptions::default() };
        let a = render(&grid, &reg, &opts, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = render(&grid, &reg, &opts, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimensions(), (64, 64));
    }

    #[test]
    fn jitter_stays_near_class_colour() {
        let reg = ClassRegistry::default();
        let grid = ClassGrid::new(16, 16, SAND).unwrap();
        let opts = RenderOptions { output_size: 16, jitter_std: 8.0, blur_sigma: 0.0 };
        let img = render(&grid, &reg, &opts, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let base = reg.get(SAND).unwrap().color;
        let mean_r = img.pixels().map(|p| p.0[0] as f32).sum::<f32>() / 256.0;
        assert!((mean_r - base[0] as f32).abs() < 3.0, "mean red {mean_r}");
        assert!(img.pixels().any(|p| p.0 != base), "jitter should vary pixels");
    }

    #[test]
    fn label_resize_never_invents_ids() {
        for style in [Style::Desert, Style::Rocky, Style::Mixed] {
            let grid = generate(style, 48, 11).unwrap();
            let before = grid.class_ids();
            for size in [17u32, 48, 100, 512] {
                let label = resize_labels(&grid, size).unwrap();
                assert_eq!(label.dimensions(), (size, size));
                let after: BTreeSet<u8> = label.as_raw().iter().copied().collect();
                assert!(after.is_subset(&before), "{style} at {size}: {after:?} ⊄ {before:?}");
            }
        }
    }

    #[test]
    fn pair_is_pixel_aligned() {
        let reg = ClassRegistry::default();
        let grid = generate(Style::Mixed, 24, 2).unwrap();
        let opts = RenderOptions { output_size: 96, ..RenderOptions::default() };
        let pair = render_pair(&grid, &reg, &opts, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(pair.image.dimensions(), pair.label.dimensions());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let reg = ClassRegistry::default();
        let grid = ClassGrid::new(4, 4, SAND).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let zero = RenderOptions { output_size: 0, ..RenderOptions::default() };
        assert!(matches!(render(&grid, &reg, &zero, &mut rng), Err(TerrainError::InvalidRender(_))));
        let neg = RenderOptions { jitter_std: -1.0, ..RenderOptions::default() };
        assert!(render(&grid, &reg, &neg, &mut rng).is_err());
        assert!(resize_labels(&grid, 0).is_err());
    }

    #[test]
    fn unknown_ids_paint_with_fallback_colour() {
        let reg = ClassRegistry::default();
        let sand = reg.get(SAND).unwrap().color;
        let grid = ClassGrid::from_vec(2, 2, vec![77, WATER, WATER, 77]).unwrap();

        let flat = colorize(&grid, &reg).unwrap();
        assert_eq!(flat.get_pixel(0, 0).0, sand);
        assert_eq!(flat.get_pixel(1, 0).0, reg.get(WATER).unwrap().color);
        assert_eq!(flat.get_pixel(1, 1).0, sand);

        let img = render(&grid, &reg, &crisp(2), &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert_eq!(img, flat);
    }

    #[test]
    fn empty_or_short_grids_are_rejected() {
        let reg = ClassRegistry::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let empty: ClassGrid = Grid { data: Vec::new(), width: 0, height: 0 };
        assert_eq!(
            render(&empty, &reg, &RenderOptions::default(), &mut rng).unwrap_err(),
            TerrainError::EmptyGrid { width: 0, height: 0 }
        );
        assert!(colorize(&empty, &reg).is_err());
        assert!(resize_labels(&empty, 8).is_err());

        let short: ClassGrid = Grid { data: vec![SAND; 5], width: 3, height: 2 };
        assert!(matches!(
            render(&short, &reg, &crisp(4), &mut rng),
            Err(TerrainError::DataLength { actual: 5, .. })
        ));
        assert!(matches!(render_pair(&short, &reg, &crisp(4), &mut rng), Err(TerrainError::DataLength { .. })));
    }
}
