//! Shared editing configuration for planar maps
//!
//! This crate is the single source of truth for the tunables that map
//! editing operations take as explicit input (split distances, x-offset
//! apportioning, coordinate rounding) and for the default property values
//! given to newly created sectors and sides.

use serde::{Deserialize, Serialize};

/// Default for apportioning texture x-offsets when a line is split
pub const DEFAULT_SPLIT_AUTO_OFFSET: bool = true;

/// Default for allowing fractional vertex positions
pub const DEFAULT_POSITION_FRAC: bool = false;

/// Distance within which merge operations split lines at nearby vertices
pub const DEFAULT_MERGE_SPLIT_DISTANCE: f64 = 0.1;

/// Default floor height for new sectors
pub const DEFAULT_FLOOR_HEIGHT: i32 = 0;

/// Default ceiling height for new sectors
pub const DEFAULT_CEILING_HEIGHT: i32 = 128;

/// Default light level for new sectors
pub const DEFAULT_LIGHT_LEVEL: i32 = 160;

/// Texture name meaning "no texture"
pub const NO_TEXTURE: &str = "-";

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Property values applied to sectors that have nothing adjacent to copy from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorDefaults {
    pub floor_texture: String,
    pub ceiling_texture: String,
    pub floor_height: i32,
    pub ceiling_height: i32,
    pub light_level: i32,
    pub special: i32,
    pub tag: i32,
}

impl Default for SectorDefaults {
    fn default() -> Self {
        Self {
            floor_texture: "FLOOR0_1".to_string(),
            ceiling_texture: "CEIL1_1".to_string(),
            floor_height: DEFAULT_FLOOR_HEIGHT,
            ceiling_height: DEFAULT_CEILING_HEIGHT,
            light_level: DEFAULT_LIGHT_LEVEL,
            special: 0,
            tag: 0,
        }
    }
}

/// Texture defaults for new sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideDefaults {
    /// Middle texture given to new one-sided front sides when no adjacent
    /// line has a texture to borrow
    pub texture_middle: String,
    pub texture_upper: String,
    pub texture_lower: String,
}

impl Default for SideDefaults {
    fn default() -> Self {
        Self {
            texture_middle: "STARTAN2".to_string(),
            texture_upper: NO_TEXTURE.to_string(),
            texture_lower: NO_TEXTURE.to_string(),
        }
    }
}

/// Editing configuration passed into the operations that need it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Apportion middle-texture x-offsets across the two halves of a split line
    pub split_auto_offset: bool,
    /// Keep fractional vertex coordinates instead of rounding to integers
    pub position_frac: bool,
    /// Split distance used when merging architecture
    pub merge_split_distance: f64,
    pub sector_defaults: SectorDefaults,
    pub side_defaults: SideDefaults,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            split_auto_offset: DEFAULT_SPLIT_AUTO_OFFSET,
            position_frac: DEFAULT_POSITION_FRAC,
            merge_split_distance: DEFAULT_MERGE_SPLIT_DISTANCE,
            sector_defaults: SectorDefaults::default(),
            side_defaults: SideDefaults::default(),
        }
    }
}

impl EditConfig {
    /// Create a config with the given offset and rounding behaviour
    pub fn new(split_auto_offset: bool, position_frac: bool) -> Self {
        Self {
            split_auto_offset,
            position_frac,
            ..Self::default()
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EditConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the config values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.merge_split_distance.is_finite() || self.merge_split_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "merge_split_distance must be a non-negative number, got {}",
                self.merge_split_distance
            )));
        }
        if self.sector_defaults.ceiling_height < self.sector_defaults.floor_height {
            return Err(ConfigError::Invalid(format!(
                "default ceiling height {} is below floor height {}",
                self.sector_defaults.ceiling_height, self.sector_defaults.floor_height
            )));
        }
        Ok(())
    }
}
