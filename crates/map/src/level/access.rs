//! Read access to entities, collections and relations.

use glam::DVec2;
use planar_config::EditConfig;
use planar_geometry::Seg2;

use super::LevelMap;
use crate::entities::{Line, MapEntity, MapObject, Sector, Side, Thing, Vertex};
use crate::store::ObjectEvent;
use crate::types::{LineId, MapFormat, ObjectId, ObjectKind, SectorId, SideId, ThingId, VertexId};

impl LevelMap {
    // ========================================================================
    // Entities by identity
    // ========================================================================

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.store.get(id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.store.get(id)
    }

    pub fn side(&self, id: SideId) -> Option<&Side> {
        self.store.get(id)
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.store.get(id)
    }

    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.store.get(id)
    }

    /// Resolve any live object by identity
    pub fn object(&self, id: ObjectId) -> Option<&MapObject> {
        self.store.resolve(id)
    }

    pub fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.store.resolve(id).map(MapObject::kind)
    }

    // ========================================================================
    // Entities by index
    // ========================================================================

    pub fn vertex_by_index(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index).and_then(|&id| self.vertex(id))
    }

    pub fn line_by_index(&self, index: usize) -> Option<&Line> {
        self.lines.get(index).and_then(|&id| self.line(id))
    }

    pub fn side_by_index(&self, index: usize) -> Option<&Side> {
        self.sides.get(index).and_then(|&id| self.side(id))
    }

    pub fn sector_by_index(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index).and_then(|&id| self.sector(id))
    }

    pub fn thing_by_index(&self, index: usize) -> Option<&Thing> {
        self.things.get(index).and_then(|&id| self.thing(id))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn line_ids(&self) -> &[LineId] {
        &self.lines
    }

    pub fn side_ids(&self) -> &[SideId] {
        &self.sides
    }

    pub fn sector_ids(&self) -> &[SectorId] {
        &self.sectors
    }

    pub fn thing_ids(&self) -> &[ThingId] {
        &self.things
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn thing_count(&self) -> usize {
        self.things.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter_map(|&id| self.vertex(id))
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter_map(|&id| self.line(id))
    }

    pub fn sides(&self) -> impl Iterator<Item = &Side> {
        self.sides.iter().filter_map(|&id| self.side(id))
    }

    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter().filter_map(|&id| self.sector(id))
    }

    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.things.iter().filter_map(|&id| self.thing(id))
    }

    /// Identities of the live collection of `kind`, in index order
    pub(crate) fn collection_ids(&self, kind: ObjectKind) -> Vec<ObjectId> {
        match kind {
            ObjectKind::Vertex => self.vertices.iter().map(|&id| id.into()).collect(),
            ObjectKind::Line => self.lines.iter().map(|&id| id.into()).collect(),
            ObjectKind::Side => self.sides.iter().map(|&id| id.into()).collect(),
            ObjectKind::Sector => self.sectors.iter().map(|&id| id.into()).collect(),
            ObjectKind::Thing => self.things.iter().map(|&id| id.into()).collect(),
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    pub fn vertex_position(&self, id: VertexId) -> Option<DVec2> {
        self.vertex(id).map(Vertex::position)
    }

    /// The segment from the line's first to second vertex
    pub fn line_seg(&self, id: LineId) -> Option<Seg2> {
        let line = self.line(id)?;
        Some(Seg2::new(
            self.vertex_position(line.v1)?,
            self.vertex_position(line.v2)?,
        ))
    }

    pub fn line_midpoint(&self, id: LineId) -> Option<DVec2> {
        self.line_seg(id).map(|seg| seg.midpoint())
    }

    /// Sector referenced by the front (`front == true`) or back side
    pub fn line_sector(&self, id: LineId, front: bool) -> Option<SectorId> {
        let side = self.line(id)?.side(front)?;
        self.side(side)?.sector
    }

    pub fn line_front_sector(&self, id: LineId) -> Option<SectorId> {
        self.line_sector(id, true)
    }

    pub fn line_back_sector(&self, id: LineId) -> Option<SectorId> {
        self.line_sector(id, false)
    }

    /// Distinct lines bounding a sector, in side order
    pub fn sector_lines(&self, id: SectorId) -> Vec<LineId> {
        let mut lines = Vec::new();
        if let Some(sector) = self.sector(id) {
            for &side in &sector.connected_sides {
                if let Some(line) = self.side(side).and_then(|s| s.line) {
                    if !lines.contains(&line) {
                        lines.push(line);
                    }
                }
            }
        }
        lines
    }

    /// Distinct vertices of a sector's bounding lines
    pub fn sector_vertices(&self, id: SectorId) -> Vec<VertexId> {
        let mut vertices = Vec::new();
        for line in self.sector_lines(id) {
            if let Some(line) = self.line(line) {
                for v in [line.v1, line.v2] {
                    if !vertices.contains(&v) {
                        vertices.push(v);
                    }
                }
            }
        }
        vertices
    }

    // ========================================================================
    // Map state
    // ========================================================================

    pub fn format(&self) -> MapFormat {
        self.format
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditConfig) {
        self.config = config;
    }

    /// Stamp of the last structural change; renderers poll this
    pub fn geometry_updated(&self) -> u64 {
        self.geometry_updated
    }

    /// Stamp of the last thing change
    pub fn things_updated(&self) -> u64 {
        self.things_updated
    }

    /// Current value of the modification clock
    pub fn current_time(&self) -> u64 {
        self.clock
    }

    pub fn object_events(&self) -> &[ObjectEvent] {
        self.store.events()
    }

    /// Drain the creation/removal journal (consumed by undo recording)
    pub fn take_object_events(&mut self) -> Vec<ObjectEvent> {
        self.store.take_events()
    }

    pub(crate) fn entity_index<T: MapEntity>(&self, id: T::Id) -> Option<usize> {
        self.store.get::<T>(id).map(MapEntity::index)
    }
}
