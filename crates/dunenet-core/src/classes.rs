//! Terrain class registry: the single join key between class grids,
//! rendered rasters, height tables and cost grids.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::grid::ClassGrid;

/// Class identifier stored in every grid cell.
pub type ClassId = u8;

pub const ROCK: ClassId = 0;
pub const BUSH: ClassId = 1;
pub const LOG: ClassId = 2;
pub const SAND: ClassId = 3;
pub const LANDSCAPE: ClassId = 4;
pub const CLEAR: ClassId = 5;
pub const GRAVEL: ClassId = 6;
pub const WATER: ClassId = 7;
pub const VEGETATION: ClassId = 8;
pub const OBSTACLE: ClassId = 9;

/// Class used for any id the registry does not know.
pub const FALLBACK_CLASS: ClassId = SAND;

/// One entry of the class registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainClass {
    pub id: ClassId,
    pub name: String,
    #[serde(rename = "rgb")]
    pub color: [u8; 3],
    /// Traversal cost in `[0, 1]`; 1 is impassable.
    pub cost: f32,
    pub traversable: bool,
}

impl TerrainClass {
    fn new(id: ClassId, name: &str, color: [u8; 3], cost: f32, traversable: bool) -> Self {
        Self { id, name: name.to_string(), color, cost, traversable }
    }

    /// Colour as `#RRGGBB`.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

/// Ordered, immutable list of terrain classes with ids `0..len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TerrainClass>", into = "Vec<TerrainClass>")]
pub struct ClassRegistry {
    classes: Vec<TerrainClass>,
}

impl ClassRegistry {
    /// Build a registry, checking ids are contiguous from 0 and costs lie in
    /// `[0, 1]`.
    pub fn new(classes: Vec<TerrainClass>) -> Result<Self> {
        if classes.is_empty() {
            return Err(TerrainError::InvalidRegistry("no classes".into()));
        }
        if classes.len() > ClassId::MAX as usize + 1 {
            return Err(TerrainError::InvalidRegistry(format!(
                "{} classes do not fit in a {}-bit class id",
                classes.len(),
                ClassId::BITS
            )));
        }
        for (i, class) in classes.iter().enumerate() {
            if class.id as usize != i {
                return Err(TerrainError::InvalidRegistry(format!(
                    "class `{}` has id {}, expected {i}",
                    class.name, class.id
                )));
            }
            if !(0.0..=1.0).contains(&class.cost) {
                return Err(TerrainError::InvalidRegistry(format!(
                    "class `{}` cost {} outside [0, 1]",
                    class.name, class.cost
                )));
            }
        }
        if classes.len() <= FALLBACK_CLASS as usize {
            return Err(TerrainError::InvalidRegistry(format!(
                "fallback class id {FALLBACK_CLASS} missing"
            )));
        }
        Ok(Self { classes })
    }

    /// Parse a JSON array of class records.
    pub fn from_json(text: &str) -> Result<Self> {
        let classes: Vec<TerrainClass> = serde_json::from_str(text)
            .map_err(|e| TerrainError::InvalidRegistry(e.to_string()))?;
        Self::new(classes)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[TerrainClass] {
        &self.classes
    }

    pub fn get(&self, id: ClassId) -> Option<&TerrainClass> {
        self.classes.get(id as usize)
    }

    /// Look up `id`, resolving unknown ids to the fallback class.
    ///
    /// Called per cell; use [`ClassRegistry::warn_unknown`] once per grid to
    /// surface unknown ids.
    pub fn get_or_fallback(&self, id: ClassId) -> &TerrainClass {
        self.get(id).unwrap_or(&self.classes[FALLBACK_CLASS as usize])
    }

    /// Distinct ids in `grid` the registry does not know, ascending.
    pub fn unknown_ids(&self, grid: &ClassGrid) -> Vec<ClassId> {
        grid.class_ids().into_iter().filter(|&id| !self.contains(id)).collect()
    }

    /// Log one warning per distinct unknown id in `grid`.
    pub fn warn_unknown(&self, grid: &ClassGrid) {
        for id in self.unknown_ids(grid) {
            log::warn!(
                "unknown class id {id} in {}×{} grid, using fallback class {FALLBACK_CLASS}",
                grid.width,
                grid.height
            );
        }
    }

    pub fn contains(&self, id: ClassId) -> bool {
        (id as usize) < self.classes.len()
    }

    pub fn by_name(&self, name: &str) -> Option<&TerrainClass> {
        self.classes.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl Default for ClassRegistry {
    /// The fixed 10-class desert-terrain schema.
    fn default() -> Self {
        Self {
            classes: vec![
                TerrainClass::new(ROCK, "Rock", [139, 115, 85], 0.9, false),
                TerrainClass::new(BUSH, "Bush", [74, 112, 35], 0.75, false),
                TerrainClass::new(LOG, "Log", [139, 69, 19], 0.85, false),
                TerrainClass::new(SAND, "Sand", [222, 184, 135], 0.2, true),
                TerrainClass::new(LANDSCAPE, "Landscape", [196, 168, 98], 0.15, true),
                TerrainClass::new(CLEAR, "Clear", [200, 210, 220], 0.1, true),
                TerrainClass::new(GRAVEL, "Gravel", [169, 169, 169], 0.35, true),
                TerrainClass::new(WATER, "Water", [30, 80, 200], 0.95, false),
                TerrainClass::new(VEGETATION, "Vegetation", [34, 139, 34], 0.5, true),
                TerrainClass::new(OBSTACLE, "Obstacle", [220, 20, 60], 1.0, false),
            ],
        }
    }
}

impl TryFrom<Vec<TerrainClass>> for ClassRegistry {
    type Error = TerrainError;

    fn try_from(classes: Vec<TerrainClass>) -> Result<Self> {
        Self::new(classes)
    }
}

impl From<ClassRegistry> for Vec<TerrainClass> {
    fn from(registry: ClassRegistry) -> Self {
        registry.classes
    }
}
