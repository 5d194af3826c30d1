use std::collections::BTreeSet;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::classes::ClassId;
use crate::error::{Result, TerrainError};

/// A 2D grid of cells stored row-major: `data[row * width + col]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// One terrain class id per cell.
pub type ClassGrid = Grid<ClassId>;
/// Smoothed traversability cost per cell, in `[0, 1]`.
pub type CostGrid = Grid<f32>;
/// Terrain height per cell; unbounded, water sits below zero.
pub type HeightGrid = Grid<f32>;

impl<T: Clone> Grid<T> {
    /// Create a `width × height` grid filled with `fill`.
    ///
    /// Zero-sized grids are rejected: no stage has a meaningful 0×0 output.
    pub fn new(width: usize, height: usize, fill: T) -> Result<Self> {
        ensure_non_empty(width, height)?;
        Ok(Self { data: vec![fill; width * height], width, height })
    }
}

impl<T> Grid<T> {
    /// Wrap existing row-major data, checking it matches the dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        ensure_non_empty(width, height)?;
        if data.len() != width * height {
            return Err(TerrainError::DataLength { width, height, actual: data.len() });
        }
        Ok(Self { data, width, height })
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        ensure_non_empty(width, height)?;
        let mut data = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                data.push(f(r, c));
            }
        }
        Ok(Self { data, width, height })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: T) {
        self.data[row * self.width + col] = val;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Apply `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid { data: self.data.iter().map(f).collect(), width: self.width, height: self.height }
    }

    /// Rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.width.max(1))
    }

    /// Check the grid is non-empty and its data matches its dimensions.
    ///
    /// Fields are public, so grids assembled by hand bypass the checked
    /// constructors; stages that index cells call this first.
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty(self.width, self.height)?;
        if self.data.len() != self.width * self.height {
            return Err(TerrainError::DataLength {
                width: self.width,
                height: self.height,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl Grid<f32> {
    pub fn min_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }
}

impl ClassGrid {
    /// Read a single-channel label raster, one class id per pixel.
    ///
    /// Ids are taken verbatim; ids outside the registry resolve to the
    /// fallback class at lookup time.
    pub fn from_luma(img: &GrayImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        Self::from_vec(w as usize, h as usize, img.as_raw().clone())
    }

    /// Single-channel raster with one byte per cell.
    pub fn to_luma(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
    }

    /// Distinct class ids present in the grid, ascending.
    pub fn class_ids(&self) -> BTreeSet<ClassId> {
        self.data.iter().copied().collect()
    }

    /// Number of cells carrying `id`.
    pub fn count(&self, id: ClassId) -> usize {
        self.data.iter().filter(|&&c| c == id).count()
    }
}

fn ensure_non_empty(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyGrid { width, height });
    }
    Ok(())
}
