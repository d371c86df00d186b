//! Creation and removal events emitted by the object store.

use serde::{Deserialize, Serialize};

use crate::types::{ObjectId, ObjectKind};

/// Lifecycle events recorded for external change tracking (undo).
///
/// The store only appends; a consumer drains the journal with
/// [`ObjectStore::take_events`](super::ObjectStore::take_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectEvent {
    /// A new object was allocated and added to the map.
    Created { id: ObjectId, kind: ObjectKind },
    /// An object was taken out of the map. Its identity stays resolvable
    /// through [`ObjectStore::resolve_any`](super::ObjectStore::resolve_any).
    Removed { id: ObjectId, kind: ObjectKind },
    /// A previously removed object was put back into the map.
    Restored { id: ObjectId, kind: ObjectKind },
}

impl ObjectEvent {
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectEvent::Created { id, .. }
            | ObjectEvent::Removed { id, .. }
            | ObjectEvent::Restored { id, .. } => *id,
        }
    }
}
