//! Procedural terrain-label synthesis and traversability cost maps.
//!
//! Pipeline: seed + style → noise fields → rule cascade → class grid.
//! A class grid feeds the renderer (training rasters), the height field
//! (preview terrain) and the cost-map builder (planner input).

pub mod augment;
pub mod classes;
pub mod costmap;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod height;
pub mod noise;
pub mod render;
pub mod report;
pub mod terrain;

pub use classes::{ClassId, ClassRegistry, TerrainClass};
pub use costmap::{build_cost_grid, export_grid, visualize, CostMapConfig, OccupancyGrid};
pub use error::{Result, TerrainError};
pub use grid::{ClassGrid, CostGrid, Grid, HeightGrid};
pub use terrain::{generate, Style};
