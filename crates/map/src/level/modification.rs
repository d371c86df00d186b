//! Topology edits: moving, splitting, merging, flipping and removal.
//!
//! Every operation here keeps both directions of each relation in sync and
//! invalidates the cached geometry it affects before returning. Removals
//! compact the live collections by swap-with-last and fix the moved
//! entity's index in the same step.

use glam::DVec2;
use tracing::{debug, trace};

use super::{LevelMap, push_entity, swap_remove_entity};
use crate::entities::{Line, Sector, Side, Thing, Vertex};
use crate::types::{LineId, MapError, SectorId, SideId, ThingId, VertexId};

impl LevelMap {
    // ========================================================================
    // Moving
    // ========================================================================

    pub fn move_vertex(&mut self, id: VertexId, x: f64, y: f64) -> Result<(), MapError> {
        let vertex = self.entity_mut::<Vertex>(id)?;
        vertex.position = DVec2::new(x, y);
        let lines = vertex.connected_lines.clone();

        for line in lines {
            self.invalidate_line(line);
        }
        self.touch::<Vertex>(id);
        self.set_geometry_updated();
        Ok(())
    }

    pub fn move_thing(&mut self, id: ThingId, x: f64, y: f64) -> Result<(), MapError> {
        self.entity_mut::<Thing>(id)?.position = DVec2::new(x, y);
        self.touch::<Thing>(id);
        self.set_things_updated();
        Ok(())
    }

    // ========================================================================
    // Vertex merging
    // ========================================================================

    /// Merge vertex `b` into `a`: every line using `b` is rewired to `a`, `b`
    /// is removed, and lines that became zero-length are removed.
    pub fn merge_vertices(&mut self, a: VertexId, b: VertexId) -> Result<(), MapError> {
        if a == b {
            return Err(MapError::SameVertex);
        }
        self.entity::<Vertex>(a)?;
        let lines = self.entity::<Vertex>(b)?.connected_lines.clone();

        let mut zero_length = Vec::new();
        for &line_id in &lines {
            if let Some(line) = self.store.get_mut::<Line>(line_id) {
                if line.v1 == b {
                    line.v1 = a;
                }
                if line.v2 == b {
                    line.v2 = a;
                }
                if line.v1 == line.v2 {
                    zero_length.push(line_id);
                }
            }
            if let Some(vertex) = self.store.get_mut::<Vertex>(a) {
                vertex.connect_line(line_id);
            }
            self.invalidate_line(line_id);
            self.touch::<Line>(line_id);
        }

        if let Some(vertex) = self.store.get_mut::<Vertex>(b) {
            vertex.connected_lines.clear();
        }
        swap_remove_entity::<Vertex>(&mut self.store, &mut self.vertices, b);

        for line in zero_length {
            self.remove_line(line);
        }

        self.touch::<Vertex>(a);
        self.set_geometry_updated();
        trace!("merge_vertices: {:?} <- {:?} ({} lines)", a, b, lines.len());
        Ok(())
    }

    /// Merge every vertex at exactly `(x, y)` into the first one found.
    ///
    /// Returns the surviving vertex, or `None` if there is no vertex there.
    pub fn merge_vertices_point(&mut self, x: f64, y: f64) -> Option<VertexId> {
        let point = DVec2::new(x, y);
        let at_point: Vec<VertexId> = self
            .vertices()
            .filter(|v| v.position == point)
            .map(|v| v.id)
            .collect();

        let (&target, rest) = at_point.split_first()?;
        for &other in rest {
            // Both vertices were just found live
            let _ = self.merge_vertices(target, other);
        }
        Some(target)
    }

    // ========================================================================
    // Splitting and flipping
    // ========================================================================

    /// Split `line` at `vertex`.
    ///
    /// The line is shortened to end at `vertex` and a new line continues to
    /// the original second endpoint, carrying copies of both sides with the
    /// same sectors. With `split_auto_offset` enabled, the x-offsets are
    /// shifted so textures stay aligned across the split.
    pub fn split_line(&mut self, line_id: LineId, vertex: VertexId) -> Result<LineId, MapError> {
        let line = self.entity::<Line>(line_id)?;
        self.entity::<Vertex>(vertex)?;
        let (old_v2, side1, side2) = (line.v2, line.side1, line.side2);

        // ===== PHASE 1: SHORTEN =====
        if let Some(line) = self.store.get_mut::<Line>(line_id) {
            line.v2 = vertex;
        }
        if let Some(v) = self.store.get_mut::<Vertex>(old_v2) {
            v.disconnect_line(line_id);
        }
        if let Some(v) = self.store.get_mut::<Vertex>(vertex) {
            v.connect_line(line_id);
        }
        self.invalidate_line(line_id);

        // ===== PHASE 2: CONTINUATION LINE =====
        let new_line = self.store.allocate(|id| Line::new(id, vertex, old_v2));
        push_entity::<Line>(&mut self.store, &mut self.lines, new_line);
        self.connect_line_vertices(new_line, vertex, old_v2);
        if let Some(source) = self.line(line_id).cloned() {
            if let Some(nl) = self.store.get_mut::<Line>(new_line) {
                nl.copy_properties_from(&source);
            }
        }

        let new_side1 = side1.map(|s| self.duplicate_side(s));
        let new_side2 = side2.map(|s| self.duplicate_side(s));
        for (side, front) in [(new_side1, true), (new_side2, false)] {
            if let Some(side) = side {
                self.attach_side(new_line, side, front);
            }
        }

        // ===== PHASE 3: OFFSETS =====
        if self.config.split_auto_offset {
            let length = self.line_length(line_id);
            let new_length = self.line_length(new_line);
            if let (Some(old), Some(new)) = (side1, new_side1) {
                let offset = self.side(old).map_or(0, |s| s.offset_x);
                if let Some(side) = self.store.get_mut::<Side>(new) {
                    side.offset_x = offset + length.round() as i32;
                }
            }
            if let Some(old) = side2 {
                if let Some(side) = self.store.get_mut::<Side>(old) {
                    side.offset_x += new_length.round() as i32;
                }
            }
        }

        self.touch::<Line>(line_id);
        self.touch::<Line>(new_line);
        self.set_geometry_updated();
        trace!("split_line: {:?} at {:?} -> {:?}", line_id, vertex, new_line);
        Ok(new_line)
    }

    /// Split every line passing closer than `split_dist` to `vertex` at it.
    ///
    /// Returns the number of lines split.
    pub fn split_lines_at(&mut self, vertex: VertexId, split_dist: f64) -> usize {
        let Some(point) = self.vertex_position(vertex) else {
            return 0;
        };

        let candidates: Vec<LineId> = self
            .lines()
            .filter(|l| !l.has_vertex(vertex))
            .map(|l| l.id)
            .collect();

        let mut count = 0;
        for line in candidates {
            if self.line_distance_to(line, point) < split_dist && self.split_line(line, vertex).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Reverse the direction of a line, optionally swapping its sides so each
    /// side keeps facing the same region
    pub fn flip_line(&mut self, id: LineId, swap_sides: bool) -> Result<(), MapError> {
        let line = self.entity_mut::<Line>(id)?;
        std::mem::swap(&mut line.v1, &mut line.v2);
        if swap_sides {
            std::mem::swap(&mut line.side1, &mut line.side2);
        }
        self.invalidate_line(id);
        self.touch::<Line>(id);
        self.set_geometry_updated();
        Ok(())
    }

    /// Point one endpoint of a line at a different vertex
    pub(crate) fn set_line_vertex(&mut self, id: LineId, first: bool, vertex: VertexId) -> Result<(), MapError> {
        self.entity::<Vertex>(vertex)?;
        let line = self.entity_mut::<Line>(id)?;
        let old = if first {
            std::mem::replace(&mut line.v1, vertex)
        } else {
            std::mem::replace(&mut line.v2, vertex)
        };
        let still_uses_old = line.has_vertex(old);

        if !still_uses_old {
            if let Some(v) = self.store.get_mut::<Vertex>(old) {
                v.disconnect_line(id);
            }
        }
        if let Some(v) = self.store.get_mut::<Vertex>(vertex) {
            v.connect_line(id);
        }
        self.invalidate_line(id);
        self.touch::<Line>(id);
        self.set_geometry_updated();
        Ok(())
    }

    // ========================================================================
    // Side and sector assignment
    // ========================================================================

    /// Make the front or back of `line` reference `sector`, creating a side
    /// if there is none.
    ///
    /// Returns false if the side already referenced `sector`.
    pub fn set_line_sector(&mut self, line: LineId, sector: SectorId, front: bool) -> Result<bool, MapError> {
        let existing = self.entity::<Line>(line)?.side(front);
        self.entity::<Sector>(sector)?;

        match existing {
            Some(side) => {
                if self.side(side).and_then(|s| s.sector) == Some(sector) {
                    return Ok(false);
                }
                self.set_side_sector(side, sector)?;
            }
            None => {
                let side = self.create_side_unchecked(Some(sector));
                self.attach_side(line, side, front);
            }
        }
        self.invalidate_line(line);
        self.touch::<Line>(line);
        Ok(true)
    }

    /// Remove the front or back side of a line
    pub fn clear_line_side(&mut self, line: LineId, front: bool) -> Result<bool, MapError> {
        match self.entity::<Line>(line)?.side(front) {
            Some(side) => Ok(self.remove_side(side, true)),
            None => Ok(false),
        }
    }

    /// Replace the front or back side of a line with `side`.
    ///
    /// A side that already belongs to a line is duplicated rather than shared.
    pub fn set_line_side(&mut self, line: LineId, side: SideId, front: bool) -> Result<(), MapError> {
        let current = self.entity::<Line>(line)?.side(front);
        let parent = self.entity::<Side>(side)?.line;
        if current == Some(side) {
            return Ok(());
        }

        if let Some(current) = current {
            self.remove_side(current, true);
        }
        let side = if parent.is_some() {
            self.duplicate_side(side)
        } else {
            side
        };
        self.attach_side(line, side, front);
        self.invalidate_line(line);
        self.touch::<Line>(line);
        Ok(())
    }

    /// Move a side to a different sector
    pub fn set_side_sector(&mut self, side: SideId, sector: SectorId) -> Result<(), MapError> {
        self.entity::<Sector>(sector)?;
        let old = self.entity::<Side>(side)?.sector;
        if old == Some(sector) {
            return Ok(());
        }

        if let Some(old) = old {
            if let Some(s) = self.store.get_mut::<Sector>(old) {
                s.connected_sides.retain(|&other| other != side);
                s.reset_shape();
            }
            self.touch::<Sector>(old);
        }
        if let Some(s) = self.store.get_mut::<Side>(side) {
            s.sector = Some(sector);
        }
        self.connect_side_sector(side, sector);
        self.touch::<Side>(side);
        self.set_geometry_updated();
        Ok(())
    }

    /// Link a parentless side to a line slot
    pub(crate) fn attach_side(&mut self, line: LineId, side: SideId, front: bool) {
        if let Some(l) = self.store.get_mut::<Line>(line) {
            if front {
                l.side1 = Some(side);
            } else {
                l.side2 = Some(side);
            }
        }
        if let Some(s) = self.store.get_mut::<Side>(side) {
            s.line = Some(line);
        }
    }

    /// Create a parentless copy of a side in the same sector
    pub(crate) fn duplicate_side(&mut self, side: SideId) -> SideId {
        let source = self.side(side).cloned();
        let sector = source.as_ref().and_then(|s| s.sector);
        let copy = self.create_side_unchecked(sector);
        if let Some(source) = source {
            for texture in source.textures() {
                self.usage.adjust_texture(texture, 1);
            }
            self.usage.adjust_texture(planar_config::NO_TEXTURE, -3);
            if let Some(s) = self.store.get_mut::<Side>(copy) {
                s.copy_properties_from(&source);
            }
        }
        copy
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove a vertex.
    ///
    /// With `merge_lines` and exactly two connected lines, the two lines are
    /// joined into one (the first line is extended over the second). The
    /// joined line is removed if it then overlaps another line. Otherwise
    /// every connected line is removed.
    pub fn remove_vertex(&mut self, id: VertexId, merge_lines: bool) -> Result<(), MapError> {
        let lines = self.entity::<Vertex>(id)?.connected_lines.clone();

        if merge_lines && lines.len() == 2 {
            let (keep, drop) = (lines[0], lines[1]);
            let far_end = self.line(drop).map(|l| l.other_vertex(id));
            self.remove_line(drop);

            if let Some(far_end) = far_end {
                let first = self.line(keep).is_some_and(|l| l.v1 == id);
                self.set_line_vertex(keep, first, far_end)?;

                let overlapping = self.vertex(far_end).is_some_and(|v| {
                    v.connected_lines.iter().any(|&other| {
                        other != keep
                            && match (self.line(other), self.line(keep)) {
                                (Some(a), Some(b)) => a.overlaps(b),
                                _ => false,
                            }
                    })
                });
                let zero_length = self.line(keep).is_some_and(|l| l.v1 == l.v2);
                if overlapping || zero_length {
                    self.remove_line(keep);
                }
            }
        } else {
            for line in lines {
                self.remove_line(line);
            }
        }

        if let Some(vertex) = self.store.get_mut::<Vertex>(id) {
            vertex.connected_lines.clear();
        }
        swap_remove_entity::<Vertex>(&mut self.store, &mut self.vertices, id);
        self.set_geometry_updated();
        trace!("remove_vertex: {:?}", id);
        Ok(())
    }

    /// Remove a line and both of its sides, disconnecting its vertices.
    ///
    /// Returns false if the line is not live.
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let Some(line) = self.line(id) else {
            return false;
        };
        let (v1, v2, side1, side2) = (line.v1, line.v2, line.side1, line.side2);

        self.invalidate_line(id);
        for side in [side1, side2].into_iter().flatten() {
            self.remove_side(side, false);
        }
        for v in [v1, v2] {
            if let Some(vertex) = self.store.get_mut::<Vertex>(v) {
                vertex.disconnect_line(id);
            }
        }

        let removed = swap_remove_entity::<Line>(&mut self.store, &mut self.lines, id);
        self.set_geometry_updated();
        trace!("remove_line: {:?}", id);
        removed
    }

    /// Remove a side, detaching it from its sector (and from its line when
    /// `remove_from_line` is set). A sector left with no sides is removed.
    pub fn remove_side(&mut self, id: SideId, remove_from_line: bool) -> bool {
        let Some(side) = self.side(id) else {
            return false;
        };
        let (line, sector) = (side.line, side.sector);
        let textures = side.textures().map(str::to_string);

        if remove_from_line {
            if let Some(line) = line {
                if let Some(l) = self.store.get_mut::<Line>(line) {
                    if l.side1 == Some(id) {
                        l.side1 = None;
                    }
                    if l.side2 == Some(id) {
                        l.side2 = None;
                    }
                }
                self.touch::<Line>(line);
            }
        }

        if let Some(sector) = sector {
            let now_empty = match self.store.get_mut::<Sector>(sector) {
                Some(s) => {
                    s.connected_sides.retain(|&other| other != id);
                    s.reset_shape();
                    s.connected_sides.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.remove_sector(sector);
            }
        }

        for texture in &textures {
            self.usage.adjust_texture(texture, -1);
        }
        let removed = swap_remove_entity::<Side>(&mut self.store, &mut self.sides, id);
        self.set_geometry_updated();
        removed
    }

    /// Remove a sector. Sides still referencing it are left without a sector
    /// and are picked up by the invalid-side cleanup pass.
    pub fn remove_sector(&mut self, id: SectorId) -> bool {
        let Some(sector) = self.sector(id) else {
            return false;
        };
        let sides = sector.connected_sides.clone();
        let flats = [sector.floor_texture.clone(), sector.ceiling_texture.clone()];

        for side in sides {
            if let Some(s) = self.store.get_mut::<Side>(side) {
                s.sector = None;
            }
        }
        for flat in &flats {
            self.usage.adjust_flat(flat, -1);
        }

        let removed = swap_remove_entity::<Sector>(&mut self.store, &mut self.sectors, id);
        self.set_geometry_updated();
        debug!("remove_sector: {:?}", id);
        removed
    }

    pub fn remove_thing(&mut self, id: ThingId) -> bool {
        let Some(thing_type) = self.thing(id).map(|t| t.thing_type) else {
            return false;
        };
        self.usage.adjust_thing_type(thing_type, -1);
        let removed = swap_remove_entity::<Thing>(&mut self.store, &mut self.things, id);
        self.set_things_updated();
        removed
    }
}

#[cfg(test)]
mod tests {
    use planar_config::EditConfig;

    use super::*;
    use crate::level::test_util::square_room;
    use crate::types::MapFormat;

    #[test]
    fn test_split_line_keeps_sectors() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        // Left wall runs (0,0) -> (0,64)
        let v = map.create_vertex(0.0, 32.0, -1.0);

        let new_line = map.split_line(lines[0], v).unwrap();

        assert_eq!(map.line_count(), 5);
        assert_eq!(map.line_front_sector(lines[0]), Some(sector));
        assert_eq!(map.line_front_sector(new_line), Some(sector));
        assert_eq!(map.line(lines[0]).unwrap().v2(), v);
        assert_eq!(map.line(new_line).unwrap().v1(), v);
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 5);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_split_line_auto_offset() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_line_sector(lines[0], sector, false).unwrap();
        map.set_int_property(lines[0], "side1.offsetx", 4).unwrap();
        map.set_int_property(lines[0], "side2.offsetx", 2).unwrap();

        let v = map.create_vertex(0.0, 16.0, -1.0);
        let new_line = map.split_line(lines[0], v).unwrap();

        assert_eq!(map.int_property(new_line, "side1.offsetx"), 4 + 16);
        assert_eq!(map.int_property(lines[0], "side1.offsetx"), 4);
        assert_eq!(map.int_property(lines[0], "side2.offsetx"), 2 + 48);
    }

    #[test]
    fn test_split_line_without_auto_offset() {
        let mut map = LevelMap::new(MapFormat::Doom, EditConfig::new(false, false));
        let (_, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_int_property(lines[0], "side1.offsetx", 4).unwrap();

        let v = map.create_vertex(0.0, 16.0, -1.0);
        let new_line = map.split_line(lines[0], v).unwrap();
        assert_eq!(map.int_property(new_line, "side1.offsetx"), 4);
    }

    #[test]
    fn test_split_then_merge_restores_line() {
        let mut map = LevelMap::new(MapFormat::Doom, EditConfig::new(false, false));
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_string_property(lines[0], "side1.texturemiddle", "BRICK").unwrap();
        map.set_int_property(lines[0], "side1.offsety", 8).unwrap();
        let far_end = map.line(lines[0]).unwrap().v2();

        let v = map.create_vertex(0.0, 32.0, -1.0);
        map.split_line(lines[0], v).unwrap();
        map.merge_vertices(far_end, v).unwrap();

        assert_eq!(map.line_count(), 4);
        assert_eq!(map.line(lines[0]).unwrap().v2(), far_end);
        assert_eq!(map.string_property(lines[0], "side1.texturemiddle"), "BRICK");
        assert_eq!(map.int_property(lines[0], "side1.offsety"), 8);
        assert_eq!(map.line_front_sector(lines[0]), Some(sector));
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 4);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_merge_vertices_errors() {
        let mut map = LevelMap::default();
        let v = map.create_vertex(0.0, 0.0, -1.0);
        assert_eq!(map.merge_vertices(v, v), Err(MapError::SameVertex));
        assert!(map.merge_vertices(v, VertexId(77)).is_err());
        assert_eq!(map.vertex_count(), 1);
    }

    #[test]
    fn test_merge_vertices_point() {
        let mut map = LevelMap::new(MapFormat::Udmf, EditConfig::new(true, true));
        let a = map.create_line(0.0, 0.0, 10.0, 0.0, -1.0).unwrap();
        let b = map.create_line(20.0, 0.0, 30.0, 0.0, -1.0).unwrap();
        // Drag one endpoint onto another
        let moved = map.line(b).unwrap().v1();
        map.move_vertex(moved, 10.0, 0.0).unwrap();

        let target = map.merge_vertices_point(10.0, 0.0).unwrap();
        assert_eq!(map.vertex_count(), 3);
        assert_eq!(map.vertex(target).unwrap().connected_lines().len(), 2);
        assert!(map.line(a).unwrap().has_vertex(target));
        assert!(map.line(b).unwrap().has_vertex(target));
        assert!(map.merge_vertices_point(500.0, 500.0).is_none());
    }

    #[test]
    fn test_flip_line() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        let line = map.line(lines[0]).unwrap();
        let (v1, v2) = (line.v1(), line.v2());

        map.flip_line(lines[0], true).unwrap();
        let line = map.line(lines[0]).unwrap();
        assert_eq!((line.v1(), line.v2()), (v2, v1));
        assert_eq!(map.line_front_sector(lines[0]), None);
        assert_eq!(map.line_back_sector(lines[0]), Some(sector));
        assert!((map.line_front_vector(lines[0]).x + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_set_line_sector_reports_change() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        assert!(!map.set_line_sector(lines[0], sector, true).unwrap());

        let other = map.create_sector();
        assert!(map.set_line_sector(lines[0], other, true).unwrap());
        assert_eq!(map.line_front_sector(lines[0]), Some(other));
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 3);
    }

    #[test]
    fn test_set_line_side_duplicates_parented_side() {
        let mut map = LevelMap::default();
        let (_, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        let side = map.line(lines[0]).unwrap().side1().unwrap();

        map.set_line_side(lines[1], side, false).unwrap();
        let back = map.line(lines[1]).unwrap().side2().unwrap();
        assert_ne!(back, side);
        assert_eq!(map.side(back).unwrap().line(), Some(lines[1]));
        assert_eq!(map.side(side).unwrap().line(), Some(lines[0]));
    }

    #[test]
    fn test_remove_line_cascades_to_sector() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        for &line in &lines {
            assert!(map.remove_line(line));
        }
        assert_eq!(map.side_count(), 0);
        assert!(map.sector(sector).is_none());
        assert_eq!(map.vertex_count(), 4);
        assert!(map.vertices().all(|v| v.connected_lines().is_empty()));
        assert!(!map.remove_line(lines[0]));
    }

    #[test]
    fn test_remove_vertex_merges_lines() {
        let mut map = LevelMap::default();
        let a = map.create_line(0.0, 0.0, 32.0, 0.0, -1.0).unwrap();
        map.create_line(32.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let middle = map.vertex_at(32.0, 0.0).unwrap();

        map.remove_vertex(middle, true).unwrap();

        assert_eq!(map.line_count(), 1);
        assert_eq!(map.vertex_count(), 2);
        assert!((map.line_length(a) - 64.0).abs() < 0.001);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_remove_vertex_merge_drops_overlap() {
        let mut map = LevelMap::default();
        // Triangle with a shortcut: removing the apex would duplicate the base
        map.create_line(0.0, 0.0, 32.0, 32.0, -1.0).unwrap();
        map.create_line(32.0, 32.0, 64.0, 0.0, -1.0).unwrap();
        map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let apex = map.vertex_at(32.0, 32.0).unwrap();

        map.remove_vertex(apex, true).unwrap();
        assert_eq!(map.line_count(), 1);
    }

    #[test]
    fn test_remove_vertex_without_merge() {
        let mut map = LevelMap::default();
        map.create_line(0.0, 0.0, 32.0, 0.0, -1.0).unwrap();
        map.create_line(32.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let middle = map.vertex_at(32.0, 0.0).unwrap();

        map.remove_vertex(middle, false).unwrap();
        assert_eq!(map.line_count(), 0);
        assert_eq!(map.vertex_count(), 2);
    }

    #[test]
    fn test_swap_remove_keeps_indices() {
        let mut map = LevelMap::default();
        let a = map.create_thing(0.0, 0.0);
        let b = map.create_thing(1.0, 0.0);
        let c = map.create_thing(2.0, 0.0);

        assert!(map.remove_thing(a));
        assert_eq!(map.thing_ids(), &[c, b]);
        assert_eq!(map.entity_index::<Thing>(c), Some(0));
        assert_eq!(map.entity_index::<Thing>(b), Some(1));
        assert_eq!(map.thing_type_usage(1), 2);
    }

    #[test]
    fn test_move_thing_bumps_things_counter() {
        let mut map = LevelMap::default();
        let thing = map.create_thing(0.0, 0.0);
        let before = map.things_updated();
        map.move_thing(thing, 5.0, 5.0).unwrap();
        assert!(map.things_updated() > before);
        assert_eq!(map.thing(thing).unwrap().position(), DVec2::new(5.0, 5.0));
    }
}
