//! Rule tables for the built-in synthesis styles.
//!
//! Rule order is significant: later entries overwrite earlier ones, and some
//! assignments are deliberately masked by later layers.

use super::rules::{Cascade, Cell, Rule};
use crate::classes::{BUSH, CLEAR, GRAVEL, LANDSCAPE, LOG, OBSTACLE, ROCK, SAND, VEGETATION, WATER};
use crate::noise::Band;

// ── Desert ──────────────────────────────────────────────────────────────────

/// Mostly sand with rock clusters, scattered bush and logs, rare obstacles.
pub static DESERT: Cascade = Cascade {
    name: "desert",
    default: SAND,
    bands: &[
        Band::new(3.0, 2.5, 0.4),
        Band::new(9.0, 7.0, 0.2),
        Band::new(16.0, 12.0, 0.08),
    ],
    noise_coords: |i, j, s| (i + s, j + s * 2.0),
    rules: &[
        Rule { class: ROCK, when: |c| c.wave > 0.45 },
        Rule { class: BUSH, when: |c| c.wave > 0.30 && c.noise > 0.78 },
        Rule { class: LOG, when: |c| c.wave > 0.22 && c.noise > 0.90 },
        Rule { class: LANDSCAPE, when: |c| c.wave < 0.0 },
        Rule { class: OBSTACLE, when: |c| c.noise > 0.96 },
    ],
};

// ── Rocky ───────────────────────────────────────────────────────────────────

/// Distance from the vertical centre line.
fn centre_offset(c: &Cell) -> f64 {
    (c.x - 0.5).abs()
}

/// Dense rock with a gravel and sand corridor down the middle.
pub static ROCKY: Cascade = Cascade {
    name: "rocky",
    default: ROCK,
    bands: &[
        Band::new(5.0, 4.0, 0.55),
        Band::new(10.0, 8.0, 0.25),
        Band::new(20.0, 15.0, 0.1),
    ],
    noise_coords: |i, j, s| (i * 2.0 + s, j * 3.0 + s),
    rules: &[
        Rule { class: OBSTACLE, when: |c| c.wave > 0.38 },
        Rule { class: VEGETATION, when: |c| c.wave < -0.2 },
        Rule { class: GRAVEL, when: |c| centre_offset(c) < 0.12 },
        Rule { class: SAND, when: |c| centre_offset(c) < 0.07 && c.noise < 0.55 },
        Rule { class: LOG, when: |c| centre_offset(c) < 0.12 && c.noise > 0.86 },
        Rule { class: BUSH, when: |c| centre_offset(c) > 0.35 && c.noise > 0.88 },
    ],
};

// ── Mixed ───────────────────────────────────────────────────────────────────

/// Distance from the lake centre in the bottom-right corner.
fn lake_distance(c: &Cell) -> f64 {
    (c.x - 0.82).hypot(c.z - 0.82)
}

fn in_rock_quadrant(c: &Cell) -> bool {
    c.x > 0.65 && c.z < 0.35
}

fn in_forest_quadrant(c: &Cell) -> bool {
    c.x < 0.35 && c.z < 0.35
}

/// Zoned terrain using all ten classes: lake, rock field, forest, logs,
/// clearing, paths and sand strips.
pub static MIXED: Cascade = Cascade {
    name: "mixed",
    default: LANDSCAPE,
    bands: &[
        Band::new(4.0, 3.0, 0.35),
        Band::new(10.0, 8.0, 0.15),
        Band::new(18.0, 14.0, 0.06),
    ],
    noise_coords: |i, j, s| (i + s * 3.0, j + s),
    rules: &[
        Rule { class: WATER, when: |c| lake_distance(c) < 0.18 },
        Rule {
            class: GRAVEL,
            when: |c| {
                let d = lake_distance(c);
                (0.18..0.27).contains(&d)
            },
        },
        Rule { class: ROCK, when: |c| in_rock_quadrant(c) && c.wave > 0.20 },
        Rule { class: OBSTACLE, when: |c| in_rock_quadrant(c) && c.wave > 0.35 },
        Rule { class: VEGETATION, when: in_forest_quadrant },
        Rule { class: BUSH, when: |c| in_forest_quadrant(c) && c.noise > 0.70 },
        Rule { class: LOG, when: |c| (c.x - c.z).abs() < 0.04 && c.noise > 0.80 },
        Rule {
            class: CLEAR,
            when: |c| (c.x - 0.5).abs() < 0.1 && (c.z - 0.5).abs() < 0.1 && c.noise > 0.65,
        },
        Rule { class: OBSTACLE, when: |c| c.noise > 0.97 },
        Rule {
            class: GRAVEL,
            when: |c| {
                c.current == LANDSCAPE && ((c.x - 0.5).abs() < 0.06 || (c.z - 0.5).abs() < 0.06)
            },
        },
        Rule {
            class: SAND,
            when: |c| c.current == LANDSCAPE && c.wave > 0.15 && c.noise > 0.6,
        },
    ],
};
