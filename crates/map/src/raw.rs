//! Flat raw records exchanged with external format codecs.
//!
//! A decoder produces a [`RawMap`]; [`RawMap::build`] feeds its records to the
//! map's add operations in the fixed order vertices -> sectors -> sides ->
//! lines -> things. [`LevelMap::export_raw`] reads the live collections back
//! out in index order.

use planar_config::EditConfig;
use serde::{Deserialize, Serialize};

use crate::level::{CleanupReport, LevelMap};
use crate::property::PropertyList;
use crate::types::{MapError, MapFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVertex {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSector {
    pub floor_height: i32,
    pub ceiling_height: i32,
    pub floor_texture: String,
    pub ceiling_texture: String,
    pub light: i32,
    pub special: i32,
    pub tag: i32,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSide {
    pub offset_x: i32,
    pub offset_y: i32,
    pub texture_upper: String,
    pub texture_middle: String,
    pub texture_lower: String,
    /// Index into the sector records; `None` for a side with no sector
    pub sector: Option<usize>,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub v1: usize,
    pub v2: usize,
    pub side1: Option<usize>,
    pub side2: Option<usize>,
    pub special: i32,
    pub flags: i32,
    /// Special arguments. Doom-format codecs put the sector tag in `args[0]`.
    pub args: [i32; 5],
    /// Line id. Zero in Doom format means "same as the sector tag".
    pub id: i32,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawThing {
    pub x: f64,
    pub y: f64,
    pub thing_type: i32,
    pub angle: i32,
    pub flags: i32,
    /// Thing id (TID), Hexen and UDMF only
    pub id: i32,
    /// Height above the floor, Hexen and UDMF only
    pub z: f64,
    pub special: i32,
    pub args: [i32; 5],
    #[serde(default)]
    pub properties: PropertyList,
}

/// A complete map as flat records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMap {
    pub format: MapFormat,
    pub vertices: Vec<RawVertex>,
    pub sectors: Vec<RawSector>,
    pub sides: Vec<RawSide>,
    pub lines: Vec<RawLine>,
    pub things: Vec<RawThing>,
}

impl RawMap {
    /// Build a new map from the records and run the open checks.
    ///
    /// Returns the map and the report of what the open checks removed.
    pub fn build(&self, config: EditConfig) -> Result<(LevelMap, CleanupReport), MapError> {
        let mut map = LevelMap::new(self.format, config);

        for vertex in &self.vertices {
            map.add_vertex(vertex);
        }
        for sector in &self.sectors {
            map.add_sector(sector);
        }
        for side in &self.sides {
            map.add_side(side)?;
        }
        for line in &self.lines {
            map.add_line(line)?;
        }
        for thing in &self.things {
            map.add_thing(thing);
        }

        let report = map.map_open_checks();
        map.set_opened_time();
        tracing::debug!(
            "RawMap::build: {} vertices, {} lines, {} sides, {} sectors, {} things ({:?})",
            map.vertex_count(),
            map.line_count(),
            map.side_count(),
            map.sector_count(),
            map.thing_count(),
            report
        );
        Ok((map, report))
    }

    /// Serialize the records as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
