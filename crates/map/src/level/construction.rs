//! Creation of entities: editor-facing create operations and raw record import/export.

use glam::DVec2;
use planar_geometry::round_position;
use tracing::{trace, warn};

use super::{LevelMap, push_entity};
use crate::entities::{Line, Sector, Side, Thing, Vertex};
use crate::raw::{RawLine, RawMap, RawSector, RawSide, RawThing, RawVertex};
use crate::types::{LineId, MapError, MapFormat, ObjectKind, SectorId, SideId, ThingId, VertexId};

impl LevelMap {
    // ========================================================================
    // Editor create operations
    // ========================================================================

    /// Create a vertex at `(x, y)`, or return the existing vertex there.
    ///
    /// Coordinates are rounded unless fractional positions are enabled. If
    /// `split_dist >= 0`, every line passing closer than `split_dist` to the
    /// new vertex is split at it.
    pub fn create_vertex(&mut self, x: f64, y: f64, split_dist: f64) -> VertexId {
        let point = self.snap_position(DVec2::new(x, y));

        if let Some(existing) = self.vertex_at(point.x, point.y) {
            return existing;
        }

        let id = self.store.allocate(|id| Vertex::new(id, point));
        push_entity::<Vertex>(&mut self.store, &mut self.vertices, id);
        self.touch::<Vertex>(id);

        if split_dist >= 0.0 {
            self.split_lines_at(id, split_dist);
        }

        self.set_geometry_updated();
        trace!("create_vertex: {:?} at {:?}", id, point);
        id
    }

    /// Create a line from `(x1, y1)` to `(x2, y2)`, creating (and splitting
    /// at) vertices as needed
    pub fn create_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        split_dist: f64,
    ) -> Result<LineId, MapError> {
        let p1 = self.snap_position(DVec2::new(x1, y1));
        let p2 = self.snap_position(DVec2::new(x2, y2));

        let v1 = match self.vertex_at(p1.x, p1.y) {
            Some(v) => v,
            None => self.create_vertex(p1.x, p1.y, split_dist),
        };
        let v2 = match self.vertex_at(p2.x, p2.y) {
            Some(v) => v,
            None => self.create_vertex(p2.x, p2.y, split_dist),
        };

        self.create_line_between(v1, v2, false)
    }

    /// Create a line between two existing vertices.
    ///
    /// Unless `force` is set, an existing line between the same vertices (in
    /// either direction) is returned instead of creating a duplicate.
    pub fn create_line_between(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        force: bool,
    ) -> Result<LineId, MapError> {
        let vertex1 = self.entity::<Vertex>(v1)?;
        self.entity::<Vertex>(v2)?;

        if !force {
            let existing = vertex1.connected_lines.iter().copied().find(|&l| {
                self.line(l)
                    .is_some_and(|line| (line.v1 == v1 && line.v2 == v2) || (line.v1 == v2 && line.v2 == v1))
            });
            if let Some(line) = existing {
                return Ok(line);
            }
        }

        let id = self.store.allocate(|id| Line::new(id, v1, v2));
        push_entity::<Line>(&mut self.store, &mut self.lines, id);
        self.connect_line_vertices(id, v1, v2);
        self.touch::<Line>(id);
        self.set_geometry_updated();

        trace!("create_line_between: {:?} ({:?} -> {:?})", id, v1, v2);
        Ok(id)
    }

    /// Create a side referencing `sector`, not yet attached to a line
    pub fn create_side(&mut self, sector: SectorId) -> Result<SideId, MapError> {
        self.entity::<Sector>(sector)?;
        Ok(self.create_side_unchecked(Some(sector)))
    }

    pub(crate) fn create_side_unchecked(&mut self, sector: Option<SectorId>) -> SideId {
        let id = self.store.allocate(|id| Side::new(id, sector));
        push_entity::<Side>(&mut self.store, &mut self.sides, id);
        if let Some(sector) = sector {
            self.connect_side_sector(id, sector);
        }
        self.usage.adjust_texture(planar_config::NO_TEXTURE, 3);
        self.touch::<Side>(id);
        id
    }

    /// Create a sector with blank properties
    pub fn create_sector(&mut self) -> SectorId {
        let id = self.store.allocate(Sector::new);
        push_entity::<Sector>(&mut self.store, &mut self.sectors, id);
        self.usage.adjust_flat("", 2);
        self.touch::<Sector>(id);
        trace!("create_sector: {:?}", id);
        id
    }

    /// Create a thing of type 1 at `(x, y)`
    pub fn create_thing(&mut self, x: f64, y: f64) -> ThingId {
        let id = self
            .store
            .allocate(|id| Thing::new(id, DVec2::new(x, y), 1));
        push_entity::<Thing>(&mut self.store, &mut self.things, id);
        self.usage.adjust_thing_type(1, 1);
        self.touch::<Thing>(id);
        self.set_things_updated();
        id
    }

    /// Apply the configured default surface properties to a sector
    pub fn apply_sector_defaults(&mut self, sector: SectorId) -> Result<(), MapError> {
        self.entity::<Sector>(sector)?;
        let defaults = self.config.sector_defaults.clone();

        self.set_sector_flat(sector, false, &defaults.floor_texture);
        self.set_sector_flat(sector, true, &defaults.ceiling_texture);
        if let Some(s) = self.store.get_mut::<Sector>(sector) {
            s.floor_height = defaults.floor_height;
            s.ceiling_height = defaults.ceiling_height;
            s.light = defaults.light_level;
            s.special = defaults.special;
            s.tag = defaults.tag;
        }
        self.touch::<Sector>(sector);
        Ok(())
    }

    pub(crate) fn snap_position(&self, point: DVec2) -> DVec2 {
        if self.config.position_frac {
            point
        } else {
            DVec2::new(round_position(point.x), round_position(point.y))
        }
    }

    // ========================================================================
    // Relation plumbing
    // ========================================================================

    pub(crate) fn connect_line_vertices(&mut self, line: LineId, v1: VertexId, v2: VertexId) {
        for v in [v1, v2] {
            if let Some(vertex) = self.store.get_mut::<Vertex>(v) {
                vertex.connect_line(line);
            }
        }
    }

    pub(crate) fn connect_side_sector(&mut self, side: SideId, sector: SectorId) {
        if let Some(s) = self.store.get_mut::<Sector>(sector) {
            if !s.connected_sides.contains(&side) {
                s.connected_sides.push(side);
            }
            s.reset_shape();
        }
    }

    // ========================================================================
    // Raw record import
    // ========================================================================

    /// Add a vertex from a raw record (no rounding, no merging)
    pub fn add_vertex(&mut self, raw: &RawVertex) -> VertexId {
        let id = self
            .store
            .allocate(|id| Vertex::new(id, DVec2::new(raw.x, raw.y)));
        push_entity::<Vertex>(&mut self.store, &mut self.vertices, id);
        if let Some(v) = self.store.get_mut::<Vertex>(id) {
            v.properties = raw.properties.clone();
        }
        id
    }

    pub fn add_sector(&mut self, raw: &RawSector) -> SectorId {
        let id = self.store.allocate(Sector::new);
        push_entity::<Sector>(&mut self.store, &mut self.sectors, id);
        if let Some(s) = self.store.get_mut::<Sector>(id) {
            s.floor_height = raw.floor_height;
            s.ceiling_height = raw.ceiling_height;
            s.floor_texture = raw.floor_texture.clone();
            s.ceiling_texture = raw.ceiling_texture.clone();
            s.light = raw.light;
            s.special = raw.special;
            s.tag = raw.tag;
            s.properties = raw.properties.clone();
        }
        self.usage.adjust_flat(&raw.floor_texture, 1);
        self.usage.adjust_flat(&raw.ceiling_texture, 1);
        id
    }

    /// Add a side from a raw record.
    ///
    /// `raw.sector == None` creates a side with no sector (removed later by
    /// the open checks); an out-of-range sector index is rejected.
    pub fn add_side(&mut self, raw: &RawSide) -> Result<SideId, MapError> {
        let sector = match raw.sector {
            Some(index) => Some(*self.sectors.get(index).ok_or(MapError::InvalidIndex {
                kind: ObjectKind::Sector,
                index,
            })?),
            None => None,
        };

        let id = self.store.allocate(|id| Side::new(id, sector));
        push_entity::<Side>(&mut self.store, &mut self.sides, id);
        if let Some(sector) = sector {
            self.connect_side_sector(id, sector);
        }
        if let Some(s) = self.store.get_mut::<Side>(id) {
            s.offset_x = raw.offset_x;
            s.offset_y = raw.offset_y;
            s.tex_upper = raw.texture_upper.clone();
            s.tex_middle = raw.texture_middle.clone();
            s.tex_lower = raw.texture_lower.clone();
            s.properties = raw.properties.clone();
        }
        for texture in [&raw.texture_upper, &raw.texture_middle, &raw.texture_lower] {
            self.usage.adjust_texture(texture, 1);
        }
        Ok(id)
    }

    /// Add a line from a raw record.
    ///
    /// All indices are validated before anything is created. A side already
    /// used by another line is duplicated.
    pub fn add_line(&mut self, raw: &RawLine) -> Result<LineId, MapError> {
        let vertex = |index: usize| {
            self.vertices.get(index).copied().ok_or(MapError::InvalidIndex {
                kind: ObjectKind::Vertex,
                index,
            })
        };
        let v1 = vertex(raw.v1)?;
        let v2 = vertex(raw.v2)?;

        let side = |index: Option<usize>| match index {
            Some(index) => self
                .sides
                .get(index)
                .copied()
                .map(Some)
                .ok_or(MapError::InvalidIndex {
                    kind: ObjectKind::Side,
                    index,
                }),
            None => Ok(None),
        };
        let s1 = side(raw.side1)?;
        let s2 = side(raw.side2)?;

        let id = self.store.allocate(|id| Line::new(id, v1, v2));
        push_entity::<Line>(&mut self.store, &mut self.lines, id);
        self.connect_line_vertices(id, v1, v2);

        let line_id = if self.format == MapFormat::Doom && raw.id == 0 {
            raw.args[0]
        } else {
            raw.id
        };
        if let Some(line) = self.store.get_mut::<Line>(id) {
            line.special = raw.special;
            line.line_id = line_id;
            line.properties = raw.properties.clone();
            line.properties.set("flags", raw.flags);
            for (i, arg) in raw.args.iter().enumerate() {
                line.properties.set(&format!("arg{i}"), *arg);
            }
        }

        if let Some(s1) = s1 {
            self.set_line_side(id, s1, true)?;
        }
        if let Some(s2) = s2 {
            self.set_line_side(id, s2, false)?;
        }

        if v1 == v2 {
            warn!("add_line: line {:?} has identical vertices", id);
        }
        Ok(id)
    }

    pub fn add_thing(&mut self, raw: &RawThing) -> ThingId {
        let id = self
            .store
            .allocate(|id| Thing::new(id, DVec2::new(raw.x, raw.y), raw.thing_type));
        push_entity::<Thing>(&mut self.store, &mut self.things, id);
        let extended = self.format != MapFormat::Doom;
        if let Some(thing) = self.store.get_mut::<Thing>(id) {
            thing.angle = raw.angle;
            thing.flags = raw.flags;
            thing.properties = raw.properties.clone();
            if extended {
                thing.properties.set("id", raw.id);
                thing.properties.set("height", raw.z);
                thing.properties.set("special", raw.special);
                for (i, arg) in raw.args.iter().enumerate() {
                    thing.properties.set(&format!("arg{i}"), *arg);
                }
            }
        }
        self.usage.adjust_thing_type(raw.thing_type, 1);
        id
    }

    // ========================================================================
    // Raw record export
    // ========================================================================

    /// Read the live collections back out as raw records, in index order
    pub fn export_raw(&self) -> RawMap {
        let vertices = self
            .vertices()
            .map(|v| RawVertex {
                x: v.position.x,
                y: v.position.y,
                properties: v.properties.clone(),
            })
            .collect();

        let sectors = self
            .sectors()
            .map(|s| RawSector {
                floor_height: s.floor_height,
                ceiling_height: s.ceiling_height,
                floor_texture: s.floor_texture.clone(),
                ceiling_texture: s.ceiling_texture.clone(),
                light: s.light,
                special: s.special,
                tag: s.tag,
                properties: s.properties.clone(),
            })
            .collect();

        let sides = self
            .sides()
            .map(|s| RawSide {
                offset_x: s.offset_x,
                offset_y: s.offset_y,
                texture_upper: s.tex_upper.clone(),
                texture_middle: s.tex_middle.clone(),
                texture_lower: s.tex_lower.clone(),
                sector: s.sector.and_then(|id| self.entity_index::<Sector>(id)),
                properties: s.properties.clone(),
            })
            .collect();

        let lines = self
            .lines()
            .map(|l| {
                let mut properties = l.properties.clone();
                let flags = properties.remove("flags").map_or(0, |p| p.as_int());
                let mut args = [0; 5];
                for (i, arg) in args.iter_mut().enumerate() {
                    *arg = properties
                        .remove(&format!("arg{i}"))
                        .map_or(0, |p| p.as_int());
                }
                RawLine {
                    v1: self.entity_index::<Vertex>(l.v1).unwrap_or(0),
                    v2: self.entity_index::<Vertex>(l.v2).unwrap_or(0),
                    side1: l.side1.and_then(|s| self.entity_index::<Side>(s)),
                    side2: l.side2.and_then(|s| self.entity_index::<Side>(s)),
                    special: l.special,
                    flags,
                    args,
                    id: l.line_id,
                    properties,
                }
            })
            .collect();

        let things = self
            .things()
            .map(|t| {
                let mut properties = t.properties.clone();
                let id = properties.remove("id").map_or(0, |p| p.as_int());
                let z = properties.remove("height").map_or(0.0, |p| p.as_float());
                let special = properties.remove("special").map_or(0, |p| p.as_int());
                let mut args = [0; 5];
                for (i, arg) in args.iter_mut().enumerate() {
                    *arg = properties
                        .remove(&format!("arg{i}"))
                        .map_or(0, |p| p.as_int());
                }
                RawThing {
                    x: t.position.x,
                    y: t.position.y,
                    thing_type: t.thing_type,
                    angle: t.angle,
                    flags: t.flags,
                    id,
                    z,
                    special,
                    args,
                    properties,
                }
            })
            .collect();

        RawMap {
            format: self.format,
            vertices,
            sectors,
            sides,
            lines,
            things,
        }
    }
}

#[cfg(test)]
mod tests {
    use planar_config::EditConfig;

    use super::*;
    use crate::level::test_util::square_room;
    use crate::level::CleanupReport;

    #[test]
    fn test_create_vertex_rounds_and_snaps() {
        let mut map = LevelMap::default();
        let a = map.create_vertex(10.4, 19.6, -1.0);
        assert_eq!(map.vertex_position(a), Some(DVec2::new(10.0, 20.0)));

        let b = map.create_vertex(10.0, 20.0, -1.0);
        assert_eq!(a, b);
        assert_eq!(map.vertex_count(), 1);
    }

    #[test]
    fn test_create_vertex_fractional() {
        let mut map = LevelMap::new(MapFormat::Udmf, EditConfig::new(true, true));
        let v = map.create_vertex(10.25, -3.5, -1.0);
        assert_eq!(map.vertex_position(v), Some(DVec2::new(10.25, -3.5)));
    }

    #[test]
    fn test_create_vertex_splits_nearby_line() {
        let mut map = LevelMap::default();
        let line = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();

        let v = map.create_vertex(32.0, 0.0, 1.0);

        assert_eq!(map.line_count(), 2);
        assert_eq!(map.line(line).unwrap().v2(), v);
        assert_eq!(map.vertex(v).unwrap().connected_lines().len(), 2);
    }

    #[test]
    fn test_create_vertex_negative_split_distance_never_splits() {
        let mut map = LevelMap::default();
        map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        map.create_vertex(32.0, 0.0, -1.0);
        assert_eq!(map.line_count(), 1);
    }

    #[test]
    fn test_create_line_dedupes_unless_forced() {
        let mut map = LevelMap::default();
        let a = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let b = map.create_line(64.0, 0.0, 0.0, 0.0, -1.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(map.line_count(), 1);

        let line = map.line(a).unwrap();
        let (v1, v2) = (line.v1(), line.v2());
        let forced = map.create_line_between(v2, v1, true).unwrap();
        assert_ne!(forced, a);
        assert_eq!(map.line_count(), 2);
    }

    #[test]
    fn test_create_line_between_invalid_vertex() {
        let mut map = LevelMap::default();
        let v = map.create_vertex(0.0, 0.0, -1.0);
        let result = map.create_line_between(v, VertexId(999), false);
        assert!(matches!(result, Err(MapError::InvalidReference { kind: ObjectKind::Vertex, .. })));
        assert_eq!(map.line_count(), 0);
    }

    #[test]
    fn test_create_side_requires_sector() {
        let mut map = LevelMap::default();
        assert!(map.create_side(SectorId(42)).is_err());
        assert_eq!(map.side_count(), 0);

        let sector = map.create_sector();
        let side = map.create_side(sector).unwrap();
        assert_eq!(map.side(side).unwrap().sector(), Some(sector));
        assert_eq!(map.sector(sector).unwrap().connected_sides(), &[side]);
    }

    #[test]
    fn test_export_and_rebuild() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_int_property(lines[0], "special", 11).unwrap();
        map.set_int_property(lines[0], "arg0", 3).unwrap();
        map.create_thing(16.0, 16.0);

        let raw = map.export_raw();
        assert_eq!(raw.vertices.len(), 4);
        assert_eq!(raw.lines.len(), 4);
        assert_eq!(raw.sides.len(), 4);
        assert_eq!(raw.sectors.len(), 1);
        assert_eq!(raw.lines[0].args[0], 3);
        assert_eq!(raw.sides[0].sector, Some(0));

        let (rebuilt, report) = raw.build(EditConfig::default()).unwrap();
        assert_eq!(report, CleanupReport::default());
        assert_eq!(rebuilt.line_count(), 4);
        assert_eq!(rebuilt.sector_count(), 1);
        assert_eq!(rebuilt.thing_count(), 1);
        assert!(rebuilt.validate().is_ok());

        let original_light = map.sector(sector).unwrap().light();
        assert_eq!(rebuilt.sector_by_index(0).unwrap().light(), original_light);
        assert_eq!(rebuilt.line_by_index(0).unwrap().special(), 11);
    }

    #[test]
    fn test_add_line_duplicates_shared_side() {
        let mut map = LevelMap::default();
        for (x, y) in [(0.0, 0.0), (64.0, 0.0), (64.0, 64.0)] {
            map.add_vertex(&RawVertex { x, y, properties: Default::default() });
        }
        map.add_sector(&RawSector {
            floor_height: 0,
            ceiling_height: 128,
            floor_texture: "FLAT1".into(),
            ceiling_texture: "FLAT2".into(),
            light: 200,
            special: 0,
            tag: 0,
            properties: Default::default(),
        });
        map.add_side(&RawSide {
            offset_x: 0,
            offset_y: 0,
            texture_upper: "-".into(),
            texture_middle: "WALL".into(),
            texture_lower: "-".into(),
            sector: Some(0),
            properties: Default::default(),
        })
        .unwrap();

        let raw_line = |v1, v2| RawLine {
            v1,
            v2,
            side1: Some(0),
            side2: None,
            special: 0,
            flags: 1,
            args: [0; 5],
            id: 0,
            properties: Default::default(),
        };
        let a = map.add_line(&raw_line(0, 1)).unwrap();
        let b = map.add_line(&raw_line(1, 2)).unwrap();

        assert_eq!(map.side_count(), 2);
        let sa = map.line(a).unwrap().side1().unwrap();
        let sb = map.line(b).unwrap().side1().unwrap();
        assert_ne!(sa, sb);
        assert_eq!(map.side(sb).unwrap().texture_middle(), "WALL");
        assert_eq!(map.texture_usage("WALL"), 2);
    }

    #[test]
    fn test_add_line_rejects_bad_index_without_mutation() {
        let mut map = LevelMap::default();
        map.add_vertex(&RawVertex { x: 0.0, y: 0.0, properties: Default::default() });
        let result = map.add_line(&RawLine {
            v1: 0,
            v2: 5,
            side1: None,
            side2: None,
            special: 0,
            flags: 0,
            args: [0; 5],
            id: 0,
            properties: Default::default(),
        });
        assert_eq!(
            result,
            Err(MapError::InvalidIndex { kind: ObjectKind::Vertex, index: 5 })
        );
        assert_eq!(map.line_count(), 0);
    }

    #[test]
    fn test_build_removes_sectorless_sides() {
        let raw = RawMap {
            format: MapFormat::Doom,
            vertices: vec![
                RawVertex { x: 0.0, y: 0.0, properties: Default::default() },
                RawVertex { x: 64.0, y: 0.0, properties: Default::default() },
                RawVertex { x: 500.0, y: 500.0, properties: Default::default() },
            ],
            sectors: vec![],
            sides: vec![RawSide {
                offset_x: 0,
                offset_y: 0,
                texture_upper: "-".into(),
                texture_middle: "-".into(),
                texture_lower: "-".into(),
                sector: None,
                properties: Default::default(),
            }],
            lines: vec![RawLine {
                v1: 0,
                v2: 1,
                side1: Some(0),
                side2: None,
                special: 0,
                flags: 0,
                args: [7, 0, 0, 0, 0],
                id: 0,
                properties: Default::default(),
            }],
            things: vec![],
        };

        let (map, report) = raw.build(EditConfig::default()).unwrap();
        assert_eq!(report.detached_vertices, 1);
        assert_eq!(report.invalid_sides, 1);
        assert_eq!(map.side_count(), 0);
        assert_eq!(map.vertex_count(), 2);
        // Doom-format lines take their id from the sector tag
        assert_eq!(map.line_by_index(0).unwrap().line_id(), 7);
    }
}
