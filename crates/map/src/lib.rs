//! Editable planar level maps
//!
//! A map is made of vertices, lines between them, sides attached to lines,
//! sectors (the regions sides face into) and things. [`LevelMap`] keeps the
//! bidirectional relations between them consistent through every edit and
//! provides the topology operations a map editor builds on: splitting and
//! merging lines and vertices, rebuilding sectors from line outlines, and
//! cleaning up degenerate geometry.
//!
//! Every entity has a permanent [`ObjectId`] that stays valid after removal
//! (see [`ObjectStore`]), so undo can snapshot identity lists and restore
//! them later.

mod entities;
mod level;
mod property;
mod raw;
mod rules;
mod store;
mod types;

pub use entities::{
    Line, LineGeometry, MapEntity, MapObject, Sector, SectorShape, Side, Thing, Vertex,
};
pub use level::{
    CleanupReport, LevelMap, SectorBuilder, SectorEdge, UsageCounts, ValidationError,
};
pub use property::{PropertyList, PropertyValue};
pub use raw::{RawLine, RawMap, RawSector, RawSide, RawThing, RawVertex};
pub use rules::{NoRules, RuleLookup, TagType};
pub use store::{ObjectEvent, ObjectStore};
pub use types::{
    LineId, MapError, MapFormat, ObjectId, ObjectKind, SectorId, SideId, TextureParts, ThingId,
    TraceError, VertexId,
};
