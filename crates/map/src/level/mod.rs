//! The live, editable level map
//!
//! [`LevelMap`] owns the object store and the five live collections (one per
//! entity kind). Each collection is a list of identities whose position is
//! the entity's current index; removal swaps the last entry into the hole
//! and updates that entity's stored index in the same step.
//!
//! Operations are split across submodules the same way they are grouped
//! conceptually: construction, modification (topology edits), derived
//! geometry caching, queries, sector tracing and correction, merging,
//! cleanup, and change tracking.

mod access;
mod cache;
mod cleanup;
mod construction;
mod convert;
mod history;
mod merge;
mod modification;
mod properties;
mod queries;
mod sectors;
mod tags;
mod tracer;
mod usage;
mod validation;

pub use cleanup::CleanupReport;
pub use tracer::{SectorBuilder, SectorEdge};
pub use usage::UsageCounts;
pub use validation::ValidationError;

use planar_config::EditConfig;

use crate::entities::MapEntity;
use crate::store::ObjectStore;
use crate::types::{LineId, MapError, MapFormat, SectorId, SideId, ThingId, VertexId};

/// An editable planar map
#[derive(Debug, Clone)]
pub struct LevelMap {
    pub(crate) store: ObjectStore,
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) lines: Vec<LineId>,
    pub(crate) sides: Vec<SideId>,
    pub(crate) sectors: Vec<SectorId>,
    pub(crate) things: Vec<ThingId>,
    pub(crate) config: EditConfig,
    pub(crate) format: MapFormat,
    /// Monotonic clock used for modification stamps
    pub(crate) clock: u64,
    /// Stamp of the last structural (line/vertex/sector) change
    pub(crate) geometry_updated: u64,
    /// Stamp of the last thing change
    pub(crate) things_updated: u64,
    pub(crate) opened_time: u64,
    pub(crate) usage: UsageCounts,
}

impl Default for LevelMap {
    fn default() -> Self {
        Self::new(MapFormat::default(), EditConfig::default())
    }
}

impl LevelMap {
    /// Create an empty map edited as `format`
    pub fn new(format: MapFormat, config: EditConfig) -> Self {
        Self {
            store: ObjectStore::new(),
            vertices: Vec::new(),
            lines: Vec::new(),
            sides: Vec::new(),
            sectors: Vec::new(),
            things: Vec::new(),
            config,
            format,
            clock: 0,
            geometry_updated: 0,
            things_updated: 0,
            opened_time: 0,
            usage: UsageCounts::default(),
        }
    }

    // ========================================================================
    // Stamps
    // ========================================================================

    pub(crate) fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Mark an entity as modified now
    pub(crate) fn touch<T: MapEntity>(&mut self, id: T::Id) {
        let stamp = self.next_stamp();
        if let Some(object) = self.store.get_mut::<T>(id) {
            object.set_modified(stamp);
        }
    }

    pub(crate) fn set_geometry_updated(&mut self) {
        self.geometry_updated = self.next_stamp();
    }

    pub(crate) fn set_things_updated(&mut self) {
        self.things_updated = self.next_stamp();
    }

    // ========================================================================
    // Checked lookups
    // ========================================================================

    pub(crate) fn entity<T: MapEntity>(&self, id: T::Id) -> Result<&T, MapError> {
        self.store.get::<T>(id).ok_or_else(|| invalid_reference::<T>(id))
    }

    pub(crate) fn entity_mut<T: MapEntity>(&mut self, id: T::Id) -> Result<&mut T, MapError> {
        self.store.get_mut::<T>(id).ok_or_else(|| invalid_reference::<T>(id))
    }
}

pub(crate) fn invalid_reference<T: MapEntity>(id: T::Id) -> MapError {
    let object: crate::types::ObjectId = id.into();
    MapError::InvalidReference {
        kind: T::KIND,
        id: object.0,
    }
}

/// Append a freshly allocated entity to its live collection
pub(crate) fn push_entity<T: MapEntity>(store: &mut ObjectStore, list: &mut Vec<T::Id>, id: T::Id) {
    if let Some(object) = store.get_mut::<T>(id) {
        object.set_index(list.len());
    }
    list.push(id);
}

/// Remove an entity from its live collection by swap-with-last, fix up the
/// moved entity's index, and release it in the store
pub(crate) fn swap_remove_entity<T: MapEntity>(
    store: &mut ObjectStore,
    list: &mut Vec<T::Id>,
    id: T::Id,
) -> bool {
    let Some(stored) = store.get::<T>(id).map(MapEntity::index) else {
        return false;
    };
    let index = if list.get(stored) == Some(&id) {
        stored
    } else {
        match list.iter().position(|&other| other == id) {
            Some(index) => index,
            None => return false,
        }
    };

    list.swap_remove(index);
    if let Some(&moved) = list.get(index) {
        if let Some(object) = store.get_mut::<T>(moved) {
            object.set_index(index);
        }
    }
    store.release(id.into())
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Four sideless lines around a square, wound so every front faces inward
    pub fn square_lines(map: &mut LevelMap, x: f64, y: f64, size: f64) -> Vec<LineId> {
        let corners = [
            (x, y),
            (x, y + size),
            (x + size, y + size),
            (x + size, y),
        ];
        let mut lines = Vec::new();
        for i in 0..4 {
            let (x1, y1) = corners[i];
            let (x2, y2) = corners[(i + 1) % 4];
            lines.push(map.create_line(x1, y1, x2, y2, -1.0).unwrap());
        }
        lines
    }

    /// A square room with one sector and inward-facing front sides
    pub fn square_room(map: &mut LevelMap, x: f64, y: f64, size: f64) -> (SectorId, Vec<LineId>) {
        let lines = square_lines(map, x, y, size);
        let sector = map.create_sector();
        map.apply_sector_defaults(sector).unwrap();
        for &line in &lines {
            map.set_line_sector(line, sector, true).unwrap();
        }
        (sector, lines)
    }
}
