//! Change tracking for undo recording and "unsaved changes" checks.
//!
//! Every mutation stamps the touched object with the next value of the map
//! clock. An undo system snapshots the identity lists of the live
//! collections and restores them later; object state itself is restored by
//! the caller through the property surface.

use tracing::debug;

use super::LevelMap;
use crate::entities::{Line, MapEntity, MapObject, Sector, Side, Thing, Vertex};
use crate::store::ObjectStore;
use crate::types::{ObjectId, ObjectKind};

const ALL_KINDS: [ObjectKind; 5] = [
    ObjectKind::Vertex,
    ObjectKind::Line,
    ObjectKind::Side,
    ObjectKind::Sector,
    ObjectKind::Thing,
];

impl LevelMap {
    // ========================================================================
    // Modification stamps
    // ========================================================================

    /// Live objects of `kind` stamped at or after `since`
    pub fn modified_objects(&self, since: u64, kind: ObjectKind) -> Vec<ObjectId> {
        self.collection_ids(kind)
            .into_iter()
            .filter(|&id| self.object(id).is_some_and(|o| o.modified() >= since))
            .collect()
    }

    /// Live objects of every kind stamped at or after `since`
    pub fn all_modified_objects(&self, since: u64) -> Vec<ObjectId> {
        ALL_KINDS
            .iter()
            .flat_map(|&kind| self.modified_objects(since, kind))
            .collect()
    }

    /// Latest stamp on any live object
    pub fn last_modified_time(&self) -> u64 {
        self.store
            .iter_live()
            .map(MapObject::modified)
            .max()
            .unwrap_or(0)
    }

    /// True if any live object of `kind` was stamped after `since`
    pub fn modified_since(&self, since: u64, kind: ObjectKind) -> bool {
        self.collection_ids(kind)
            .into_iter()
            .any(|id| self.object(id).is_some_and(|o| o.modified() > since))
    }

    /// True if anything changed since the map was opened
    pub fn is_modified(&self) -> bool {
        self.last_modified_time() > self.opened_time
    }

    /// Record the current clock as the point the map was opened (or saved)
    pub fn set_opened_time(&mut self) {
        self.opened_time = self.clock;
    }

    // ========================================================================
    // Identity list snapshots
    // ========================================================================

    /// Identities of the live objects of `kind`, in index order
    pub fn object_id_list(&self, kind: ObjectKind) -> Vec<ObjectId> {
        self.collection_ids(kind)
    }

    /// Make the live collection of `kind` exactly `ids`.
    ///
    /// Objects not listed are taken out of the map and listed objects that
    /// were removed are put back, with their stored state as it was at
    /// removal. Indices, connection lists and usage counts are rebuilt
    /// afterwards. Identities of another kind are ignored.
    pub fn restore_object_id_list(&mut self, kind: ObjectKind, ids: &[ObjectId]) {
        let ids: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| self.store.kind_of(id) == Some(kind))
            .collect();

        let (removed, restored) = match kind {
            ObjectKind::Vertex => restore_list::<Vertex>(&mut self.store, &mut self.vertices, &ids),
            ObjectKind::Line => restore_list::<Line>(&mut self.store, &mut self.lines, &ids),
            ObjectKind::Side => restore_list::<Side>(&mut self.store, &mut self.sides, &ids),
            ObjectKind::Sector => restore_list::<Sector>(&mut self.store, &mut self.sectors, &ids),
            ObjectKind::Thing => restore_list::<Thing>(&mut self.store, &mut self.things, &ids),
        };

        match kind {
            ObjectKind::Vertex | ObjectKind::Line => {
                self.rebuild_connected_lines();
                for &line in &self.lines {
                    if let Some(l) = self.store.get_mut::<Line>(line) {
                        l.reset_geometry();
                    }
                }
                self.rebuild_connected_sides();
                self.set_geometry_updated();
            }
            ObjectKind::Side | ObjectKind::Sector => {
                self.rebuild_connected_sides();
                self.set_geometry_updated();
            }
            ObjectKind::Thing => self.set_things_updated(),
        }
        self.recount_usage();
        debug!(
            "restore_object_id_list: {} ({} removed, {} restored)",
            kind, removed, restored
        );
    }
}

/// Replace a live collection with `ids`, releasing and restoring objects in
/// the store to match. Returns (released, restored) counts.
fn restore_list<T: MapEntity>(store: &mut ObjectStore, list: &mut Vec<T::Id>, ids: &[ObjectId]) -> (usize, usize) {
    let mut released = 0;
    for &current in list.iter() {
        let current: ObjectId = current.into();
        if !ids.contains(&current) && store.release(current) {
            released += 1;
        }
    }

    let mut restored = 0;
    for &id in ids {
        if !store.is_live(id) && store.restore(id) {
            restored += 1;
        }
    }

    *list = ids.iter().map(|&id| T::Id::from(id)).collect();
    for (index, &id) in list.iter().enumerate() {
        if let Some(object) = store.get_mut::<T>(id) {
            object.set_index(index);
        }
    }
    (released, restored)
}
