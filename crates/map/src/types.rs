//! Identity, kind and error types for the map model.

use serde::{Deserialize, Serialize};

/// Permanent identity of any object in the store.
///
/// Identities are assigned monotonically and never reused. `ObjectId(0)` is
/// reserved and never resolves to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The reserved identity
    pub const NONE: ObjectId = ObjectId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl From<$name> for ObjectId {
            fn from(id: $name) -> ObjectId {
                ObjectId(id.0)
            }
        }

        impl From<ObjectId> for $name {
            fn from(id: ObjectId) -> $name {
                $name(id.0)
            }
        }
    };
}

typed_id!(
    /// Type-safe vertex identity
    VertexId
);
typed_id!(
    /// Type-safe line identity
    LineId
);
typed_id!(
    /// Type-safe side identity
    SideId
);
typed_id!(
    /// Type-safe sector identity
    SectorId
);
typed_id!(
    /// Type-safe thing identity
    ThingId
);

/// The five entity kinds held by a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Vertex,
    Line,
    Side,
    Sector,
    Thing,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectKind::Vertex => "vertex",
            ObjectKind::Line => "line",
            ObjectKind::Side => "side",
            ObjectKind::Sector => "sector",
            ObjectKind::Thing => "thing",
        };
        f.write_str(name)
    }
}

/// Level format the map is being edited as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapFormat {
    #[default]
    Doom,
    Hexen,
    Udmf,
}

/// Set of line texture parts (front/back, upper/middle/lower)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureParts(pub u8);

impl TextureParts {
    pub const NONE: TextureParts = TextureParts(0);
    pub const FRONT_MIDDLE: TextureParts = TextureParts(0x01);
    pub const FRONT_UPPER: TextureParts = TextureParts(0x02);
    pub const FRONT_LOWER: TextureParts = TextureParts(0x04);
    pub const BACK_MIDDLE: TextureParts = TextureParts(0x08);
    pub const BACK_UPPER: TextureParts = TextureParts(0x10);
    pub const BACK_LOWER: TextureParts = TextureParts(0x20);
    pub const ALL: TextureParts = TextureParts(0x3f);

    pub fn contains(self, other: TextureParts) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TextureParts {
    type Output = TextureParts;

    fn bitor(self, rhs: TextureParts) -> TextureParts {
        TextureParts(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for TextureParts {
    fn bitor_assign(&mut self, rhs: TextureParts) {
        self.0 |= rhs.0;
    }
}

/// Errors that can occur during map operations
///
/// Every variant is recoverable; operations that return one have not
/// mutated the map unless documented otherwise.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("Invalid {kind} reference: id {id}")]
    InvalidReference { kind: ObjectKind, id: u32 },

    #[error("Unknown object: id {0}")]
    UnknownObject(u32),

    #[error("Invalid {kind} index: {index}")]
    InvalidIndex { kind: ObjectKind, index: usize },

    #[error("Cannot merge a vertex with itself")]
    SameVertex,

    #[error("Cannot convert map from {from:?} to {to:?}")]
    UnsupportedConversion { from: MapFormat, to: MapFormat },

    #[error("Sector trace failed: {0}")]
    Trace(#[from] TraceError),
}

/// Reasons a sector boundary trace can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("Edge references a line that no longer exists")]
    InvalidEdge,

    #[error("Outline trace went through an edge more than once")]
    RepeatedEdge,

    #[error("Outline is not enclosed (outside map area)")]
    OutsideMap,

    #[error("Trace did not finish within the iteration limit")]
    IterationLimit,
}
