//! Identity-keyed object store.
//!
//! Every entity created during an editing session lives in one growable
//! table indexed by its permanent identity. Removing an entity from the map
//! only marks it dead; the slot is kept so identity-based lookups (undo
//! snapshots) keep working after unrelated removals.

mod events;

pub use events::ObjectEvent;

use tracing::trace;

use crate::entities::{MapEntity, MapObject};
use crate::types::{ObjectId, ObjectKind};

#[derive(Debug, Clone)]
struct Slot {
    object: MapObject,
    in_map: bool,
}

/// Table of every object ever allocated, keyed by identity
#[derive(Debug, Clone)]
pub struct ObjectStore {
    /// Slot 0 is reserved and always empty
    slots: Vec<Option<Slot>>,
    events: Vec<ObjectEvent>,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self {
            slots: vec![None],
            events: Vec::new(),
        }
    }
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new live object. `build` receives the identity assigned to it.
    pub fn allocate<T: MapEntity>(&mut self, build: impl FnOnce(T::Id) -> T) -> T::Id {
        let id = ObjectId(self.slots.len() as u32);
        let typed = T::Id::from(id);
        self.slots.push(Some(Slot {
            object: build(typed).into_object(),
            in_map: true,
        }));
        self.events.push(ObjectEvent::Created { id, kind: T::KIND });
        trace!("ObjectStore::allocate: {:?} {:?}", T::KIND, id);
        typed
    }

    /// Mark an object dead. The identity is never reused.
    ///
    /// Returns false if the identity is unknown or already released.
    pub fn release(&mut self, id: ObjectId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if !slot.in_map {
            return false;
        }
        slot.in_map = false;
        let kind = slot.object.kind();
        self.events.push(ObjectEvent::Removed { id, kind });
        trace!("ObjectStore::release: {:?} {:?}", kind, id);
        true
    }

    /// Put a released object back into the map
    pub fn restore(&mut self, id: ObjectId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if slot.in_map {
            return false;
        }
        slot.in_map = true;
        let kind = slot.object.kind();
        self.events.push(ObjectEvent::Restored { id, kind });
        true
    }

    /// Resolve a live object. Identity 0 and released objects resolve to nothing.
    pub fn resolve(&self, id: ObjectId) -> Option<&MapObject> {
        self.slot(id).filter(|s| s.in_map).map(|s| &s.object)
    }

    /// Resolve an object whether or not it is still in the map
    pub fn resolve_any(&self, id: ObjectId) -> Option<&MapObject> {
        self.slot(id).map(|s| &s.object)
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn kind_of(&self, id: ObjectId) -> Option<ObjectKind> {
        self.resolve_any(id).map(MapObject::kind)
    }

    /// Typed lookup of a live object
    pub fn get<T: MapEntity>(&self, id: T::Id) -> Option<&T> {
        self.resolve(id.into()).and_then(T::from_object)
    }

    /// Typed mutable lookup of a live object
    pub fn get_mut<T: MapEntity>(&mut self, id: T::Id) -> Option<&mut T> {
        self.slot_mut(id.into())
            .filter(|s| s.in_map)
            .and_then(|s| T::from_object_mut(&mut s.object))
    }

    /// Number of identities handed out (including released ones)
    pub fn allocated(&self) -> usize {
        self.slots.len() - 1
    }

    /// Iterate over every live object
    pub fn iter_live(&self) -> impl Iterator<Item = &MapObject> {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.in_map)
            .map(|s| &s.object)
    }

    pub fn events(&self) -> &[ObjectEvent] {
        &self.events
    }

    /// Drain the event journal
    pub fn take_events(&mut self) -> Vec<ObjectEvent> {
        std::mem::take(&mut self.events)
    }

    fn slot(&self, id: ObjectId) -> Option<&Slot> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: ObjectId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}
