//! Prioritised rule cascades over precomputed noise fields.
//!
//! A cascade starts every cell at a default class and walks its rules in
//! order; each matching rule overwrites the cell (last write wins). Rules
//! see the cell's current class, so "only overwrite the default" rules
//! observe earlier assignments rather than the original fill.

use crate::classes::ClassId;
use crate::error::Result;
use crate::grid::ClassGrid;
use crate::noise::{normalised, pseudo_random, Band, WaveField};

/// Inputs visible to a rule predicate at one cell.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// Banded wave value (unbounded).
    pub wave: f64,
    /// Pseudo-random value in `[0, 1)`.
    pub noise: f64,
    /// Normalised column coordinate in `[0, 1]`.
    pub x: f64,
    /// Normalised row coordinate in `[0, 1]`.
    pub z: f64,
    /// Class assigned so far by earlier rules.
    pub current: ClassId,
}

/// Assign `class` wherever `when` holds.
#[derive(Clone, Copy)]
pub struct Rule {
    pub class: ClassId,
    pub when: fn(&Cell) -> bool,
}

/// A named synthesis style expressed as data.
pub struct Cascade {
    pub name: &'static str,
    pub default: ClassId,
    pub bands: &'static [Band],
    /// Maps `(col, row, seed)` to the coordinates fed to [`pseudo_random`].
    pub noise_coords: fn(f64, f64, f64) -> (f64, f64),
    pub rules: &'static [Rule],
}

impl Cascade {
    /// Classify a `width × height` grid for `seed`.
    pub fn classify(&self, width: usize, height: usize, seed: u64) -> Result<ClassGrid> {
        let wave = WaveField::new(self.bands, seed);
        let s = seed as f64;
        ClassGrid::from_fn(width, height, |row, col| {
            let x = normalised(col, width);
            let z = normalised(row, height);
            let (nx, ny) = (self.noise_coords)(col as f64, row as f64, s);
            let mut cell = Cell {
                wave: wave.sample(x, z),
                noise: pseudo_random(nx, ny, seed),
                x,
                z,
                current: self.default,
            };
            for rule in self.rules {
                if (rule.when)(&cell) {
                    cell.current = rule.class;
                }
            }
            cell.current
        })
    }

    /// Every class id this cascade can emit.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::once(self.default).chain(self.rules.iter().map(|r| r.class))
    }
}
