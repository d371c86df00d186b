//! Entity definitions: vertices, lines, sides, sectors and things.
//!
//! Relations between entities are stored as identities, never as owning
//! references. The map keeps both directions of every relation in sync
//! (vertex <-> line, line <-> side, side <-> sector).

use std::cell::OnceCell;

use glam::DVec2;
use planar_geometry::{BBox, Plane, Seg2};

use crate::property::PropertyList;
use crate::types::{LineId, ObjectId, ObjectKind, SectorId, SideId, ThingId, VertexId};

/// Common behaviour of every entity kind held in the object store
pub trait MapEntity: Sized {
    type Id: Copy + Eq + std::hash::Hash + Into<ObjectId> + From<ObjectId> + std::fmt::Debug;
    const KIND: ObjectKind;

    fn from_object(object: &MapObject) -> Option<&Self>;
    fn from_object_mut(object: &mut MapObject) -> Option<&mut Self>;
    fn into_object(self) -> MapObject;

    fn id(&self) -> Self::Id;
    fn index(&self) -> usize;
    fn set_index(&mut self, index: usize);
    fn modified(&self) -> u64;
    fn set_modified(&mut self, stamp: u64);
    fn properties(&self) -> &PropertyList;
    fn properties_mut(&mut self) -> &mut PropertyList;
}

/// A 2D point anchoring one or more lines
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) index: usize,
    pub(crate) position: DVec2,
    /// Lines with this vertex as an endpoint (back-references)
    pub(crate) connected_lines: Vec<LineId>,
    pub(crate) properties: PropertyList,
    pub(crate) modified: u64,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, position: DVec2) -> Self {
        Self {
            id,
            index: 0,
            position,
            connected_lines: Vec::new(),
            properties: PropertyList::new(),
            modified: 0,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn connected_lines(&self) -> &[LineId] {
        &self.connected_lines
    }

    pub(crate) fn connect_line(&mut self, line: LineId) {
        if !self.connected_lines.contains(&line) {
            self.connected_lines.push(line);
        }
    }

    pub(crate) fn disconnect_line(&mut self, line: LineId) {
        self.connected_lines.retain(|&l| l != line);
    }
}

/// Cached derived geometry of a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub length: f64,
    /// Direction cosine
    pub ca: f64,
    /// Direction sine
    pub sa: f64,
    /// Unit vector perpendicular to the line, pointing into its front side
    pub front: DVec2,
}

/// A directed boundary edge between two vertices
#[derive(Debug, Clone)]
pub struct Line {
    pub(crate) id: LineId,
    pub(crate) index: usize,
    pub(crate) v1: VertexId,
    pub(crate) v2: VertexId,
    /// Front side (right of v1 -> v2)
    pub(crate) side1: Option<SideId>,
    /// Back side
    pub(crate) side2: Option<SideId>,
    pub(crate) special: i32,
    pub(crate) line_id: i32,
    pub(crate) properties: PropertyList,
    pub(crate) modified: u64,
    pub(crate) geometry: OnceCell<LineGeometry>,
}

impl Line {
    pub(crate) fn new(id: LineId, v1: VertexId, v2: VertexId) -> Self {
        Self {
            id,
            index: 0,
            v1,
            v2,
            side1: None,
            side2: None,
            special: 0,
            line_id: 0,
            properties: PropertyList::new(),
            modified: 0,
            geometry: OnceCell::new(),
        }
    }

    pub fn v1(&self) -> VertexId {
        self.v1
    }

    pub fn v2(&self) -> VertexId {
        self.v2
    }

    pub fn side1(&self) -> Option<SideId> {
        self.side1
    }

    pub fn side2(&self) -> Option<SideId> {
        self.side2
    }

    pub fn side(&self, front: bool) -> Option<SideId> {
        if front { self.side1 } else { self.side2 }
    }

    pub fn special(&self) -> i32 {
        self.special
    }

    pub fn line_id(&self) -> i32 {
        self.line_id
    }

    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.v1 == vertex || self.v2 == vertex
    }

    /// The endpoint opposite `vertex`
    pub fn other_vertex(&self, vertex: VertexId) -> VertexId {
        if self.v1 == vertex { self.v2 } else { self.v1 }
    }

    /// True if this line runs between the same two vertices as `other`, in
    /// either direction
    pub fn overlaps(&self, other: &Line) -> bool {
        (self.v1 == other.v1 && self.v2 == other.v2) || (self.v1 == other.v2 && self.v2 == other.v1)
    }

    pub(crate) fn reset_geometry(&mut self) {
        self.geometry = OnceCell::new();
    }

    /// Copy format-specific attributes (not vertices or sides)
    pub(crate) fn copy_properties_from(&mut self, other: &Line) {
        self.special = other.special;
        self.line_id = other.line_id;
        self.properties = other.properties.clone();
    }
}

/// A one-directional face descriptor on a line
#[derive(Debug, Clone)]
pub struct Side {
    pub(crate) id: SideId,
    pub(crate) index: usize,
    pub(crate) line: Option<LineId>,
    pub(crate) sector: Option<SectorId>,
    pub(crate) tex_upper: String,
    pub(crate) tex_middle: String,
    pub(crate) tex_lower: String,
    pub(crate) offset_x: i32,
    pub(crate) offset_y: i32,
    pub(crate) properties: PropertyList,
    pub(crate) modified: u64,
}

impl Side {
    pub(crate) fn new(id: SideId, sector: Option<SectorId>) -> Self {
        Self {
            id,
            index: 0,
            line: None,
            sector,
            tex_upper: planar_config::NO_TEXTURE.to_string(),
            tex_middle: planar_config::NO_TEXTURE.to_string(),
            tex_lower: planar_config::NO_TEXTURE.to_string(),
            offset_x: 0,
            offset_y: 0,
            properties: PropertyList::new(),
            modified: 0,
        }
    }

    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    pub fn sector(&self) -> Option<SectorId> {
        self.sector
    }

    pub fn texture_upper(&self) -> &str {
        &self.tex_upper
    }

    pub fn texture_middle(&self) -> &str {
        &self.tex_middle
    }

    pub fn texture_lower(&self) -> &str {
        &self.tex_lower
    }

    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> i32 {
        self.offset_y
    }

    pub(crate) fn textures(&self) -> [&str; 3] {
        [&self.tex_upper, &self.tex_middle, &self.tex_lower]
    }

    /// Copy textures, offsets and extra properties (not the line or sector)
    pub(crate) fn copy_properties_from(&mut self, other: &Side) {
        self.tex_upper = other.tex_upper.clone();
        self.tex_middle = other.tex_middle.clone();
        self.tex_lower = other.tex_lower.clone();
        self.offset_x = other.offset_x;
        self.offset_y = other.offset_y;
        self.properties = other.properties.clone();
    }
}

/// Cached derived geometry of a sector
#[derive(Debug, Clone, Default)]
pub struct SectorShape {
    /// Closed boundary loops, each oriented with the sector on its right
    pub outlines: Vec<Vec<DVec2>>,
    /// Every bounding edge, oriented with the sector on its right
    pub edges: Vec<Seg2>,
    pub bbox: BBox,
}

/// An enclosed region bounded by the sides that reference it
#[derive(Debug, Clone)]
pub struct Sector {
    pub(crate) id: SectorId,
    pub(crate) index: usize,
    pub(crate) floor_texture: String,
    pub(crate) ceiling_texture: String,
    pub(crate) floor_height: i32,
    pub(crate) ceiling_height: i32,
    pub(crate) light: i32,
    pub(crate) special: i32,
    pub(crate) tag: i32,
    /// Sides referencing this sector (back-references)
    pub(crate) connected_sides: Vec<SideId>,
    pub(crate) properties: PropertyList,
    pub(crate) modified: u64,
    pub(crate) shape: OnceCell<SectorShape>,
}

impl Sector {
    pub(crate) fn new(id: SectorId) -> Self {
        Self {
            id,
            index: 0,
            floor_texture: String::new(),
            ceiling_texture: String::new(),
            floor_height: 0,
            ceiling_height: 0,
            light: 0,
            special: 0,
            tag: 0,
            connected_sides: Vec::new(),
            properties: PropertyList::new(),
            modified: 0,
            shape: OnceCell::new(),
        }
    }

    pub fn floor_texture(&self) -> &str {
        &self.floor_texture
    }

    pub fn ceiling_texture(&self) -> &str {
        &self.ceiling_texture
    }

    pub fn floor_height(&self) -> i32 {
        self.floor_height
    }

    pub fn ceiling_height(&self) -> i32 {
        self.ceiling_height
    }

    pub fn light(&self) -> i32 {
        self.light
    }

    pub fn special(&self) -> i32 {
        self.special
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn connected_sides(&self) -> &[SideId] {
        &self.connected_sides
    }

    pub fn floor_plane(&self) -> Plane {
        Plane::flat(f64::from(self.floor_height))
    }

    pub fn ceiling_plane(&self) -> Plane {
        Plane::flat(f64::from(self.ceiling_height))
    }

    /// True until properties have been applied (a sector fresh from the
    /// tracer has no ceiling texture)
    pub(crate) fn is_blank(&self) -> bool {
        self.ceiling_texture.is_empty()
    }

    pub(crate) fn reset_shape(&mut self) {
        self.shape = OnceCell::new();
    }

    /// Copy surface properties (not the connected sides)
    pub(crate) fn copy_properties_from(&mut self, other: &Sector) {
        self.floor_texture = other.floor_texture.clone();
        self.ceiling_texture = other.ceiling_texture.clone();
        self.floor_height = other.floor_height;
        self.ceiling_height = other.ceiling_height;
        self.light = other.light;
        self.special = other.special;
        self.tag = other.tag;
        self.properties = other.properties.clone();
    }
}

/// A positioned point entity independent of the line graph
#[derive(Debug, Clone)]
pub struct Thing {
    pub(crate) id: ThingId,
    pub(crate) index: usize,
    pub(crate) position: DVec2,
    pub(crate) thing_type: i32,
    pub(crate) angle: i32,
    pub(crate) flags: i32,
    pub(crate) properties: PropertyList,
    pub(crate) modified: u64,
}

impl Thing {
    pub(crate) fn new(id: ThingId, position: DVec2, thing_type: i32) -> Self {
        Self {
            id,
            index: 0,
            position,
            thing_type,
            angle: 0,
            flags: 0,
            properties: PropertyList::new(),
            modified: 0,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn thing_type(&self) -> i32 {
        self.thing_type
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn flags(&self) -> i32 {
        self.flags
    }
}

/// Any entity held by the object store
#[derive(Debug, Clone)]
pub enum MapObject {
    Vertex(Vertex),
    Line(Line),
    Side(Side),
    Sector(Sector),
    Thing(Thing),
}

impl MapObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            MapObject::Vertex(_) => ObjectKind::Vertex,
            MapObject::Line(_) => ObjectKind::Line,
            MapObject::Side(_) => ObjectKind::Side,
            MapObject::Sector(_) => ObjectKind::Sector,
            MapObject::Thing(_) => ObjectKind::Thing,
        }
    }

    pub fn modified(&self) -> u64 {
        match self {
            MapObject::Vertex(o) => o.modified,
            MapObject::Line(o) => o.modified,
            MapObject::Side(o) => o.modified,
            MapObject::Sector(o) => o.modified,
            MapObject::Thing(o) => o.modified,
        }
    }

    pub fn properties(&self) -> &PropertyList {
        match self {
            MapObject::Vertex(o) => &o.properties,
            MapObject::Line(o) => &o.properties,
            MapObject::Side(o) => &o.properties,
            MapObject::Sector(o) => &o.properties,
            MapObject::Thing(o) => &o.properties,
        }
    }
}

macro_rules! impl_map_entity {
    ($ty:ident, $id:ident, $kind:ident) => {
        impl MapEntity for $ty {
            type Id = $id;
            const KIND: ObjectKind = ObjectKind::$kind;

            fn from_object(object: &MapObject) -> Option<&Self> {
                match object {
                    MapObject::$kind(o) => Some(o),
                    _ => None,
                }
            }

            fn from_object_mut(object: &mut MapObject) -> Option<&mut Self> {
                match object {
                    MapObject::$kind(o) => Some(o),
                    _ => None,
                }
            }

            fn into_object(self) -> MapObject {
                MapObject::$kind(self)
            }

            fn id(&self) -> $id {
                self.id
            }

            fn index(&self) -> usize {
                self.index
            }

            fn set_index(&mut self, index: usize) {
                self.index = index;
            }

            fn modified(&self) -> u64 {
                self.modified
            }

            fn set_modified(&mut self, stamp: u64) {
                self.modified = stamp;
            }

            fn properties(&self) -> &PropertyList {
                &self.properties
            }

            fn properties_mut(&mut self) -> &mut PropertyList {
                &mut self.properties
            }
        }
    };
}

impl_map_entity!(Vertex, VertexId, Vertex);
impl_map_entity!(Line, LineId, Line);
impl_map_entity!(Side, SideId, Side);
impl_map_entity!(Sector, SectorId, Sector);
impl_map_entity!(Thing, ThingId, Thing);
