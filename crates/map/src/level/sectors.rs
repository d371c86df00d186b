//! Sector correction: re-deriving which sector each side of a set of lines
//! belongs to after a structural edit.

use std::collections::HashSet;

use glam::DVec2;
use planar_config::NO_TEXTURE;
use planar_geometry::{line_side, rotate_point};
use tracing::{debug, trace};

use super::LevelMap;
use super::properties::SidePart;
use super::tracer::SectorBuilder;
use crate::entities::Side;
use crate::types::{LineId, SectorId, SideId, TextureParts};

/// Angle the side-sector probe ray is turned by so it does not pass
/// exactly through a vertex
const PROBE_ROTATION: f64 = 0.01;

/// Distance either side of a line's midpoint tested for sector containment
const SIDE_SAMPLE_OFFSET: f64 = 0.01;

/// One side of one line taking part in a correction run
#[derive(Debug, Clone, Copy)]
struct PendingEdge {
    line: LineId,
    front: bool,
    /// Already claimed by an accepted trace
    ignore: bool,
}

impl LevelMap {
    /// Rebuild sectors for every side of `lines`.
    ///
    /// With `existing_only`, only sides that already exist are traced (or the
    /// front of a sideless line). Otherwise the front of every line is traced,
    /// plus its back when the line's midpoint lies inside a sector.
    ///
    /// Lines with the same sector on both sides, lying inside that sector,
    /// are left alone: they do not divide it. A trace that runs into
    /// pre-existing lines, none of which already have a side facing the
    /// traced region, is taken to be inside an enclosed void and is skipped
    /// when `existing_only` is set. Sides left outside every
    /// accepted trace are removed, back-only lines are flipped, new sectors
    /// get their properties from a neighbouring sector (or the configured
    /// defaults) and new one-sided lines get a middle texture.
    pub fn correct_sectors(&mut self, lines: &[LineId], existing_only: bool) {
        // ===== PHASE 1: COLLECT EDGES =====
        let mut edges: Vec<PendingEdge> = Vec::new();
        for &id in lines {
            let Some(line) = self.line(id) else {
                continue;
            };
            let (side1, side2) = (line.side1, line.side2);
            if self.line_inside_own_sector(id) {
                trace!("correct_sectors: {:?} lies inside its own sector", id);
                continue;
            }
            let mut push = |front| {
                edges.push(PendingEdge {
                    line: id,
                    front,
                    ignore: false,
                })
            };

            if existing_only {
                if side1.is_some() || side2.is_none() {
                    push(true);
                }
                if side2.is_some() {
                    push(false);
                }
            } else {
                push(true);
                let inside = self
                    .line_midpoint(id)
                    .is_some_and(|mid| self.sector_at(mid).is_some());
                if inside {
                    push(false);
                }
            }
        }

        let sides_correct: Vec<SideId> = edges
            .iter()
            .filter_map(|e| self.line(e.line).and_then(|l| l.side(e.front)))
            .collect();
        let prior_sectors: HashSet<SectorId> = self.sectors.iter().copied().collect();
        let prior_sides: HashSet<SideId> = self.sides.iter().copied().collect();

        // ===== PHASE 2: TRACE =====
        let mut builder = SectorBuilder::new();
        let mut sectors_reused: Vec<SectorId> = Vec::new();
        let mut runs = 0;
        for index in 0..edges.len() {
            let edge = edges[index];
            if edge.ignore {
                continue;
            }

            runs += 1;
            if let Err(err) = builder.trace_sector(self, edge.line, edge.front) {
                trace!("correct_sectors: trace from {:?} failed: {}", edge.line, err);
                continue;
            }

            let mut has_existing_lines = false;
            let mut has_existing_sides = false;
            let mut edges_in_sector = Vec::new();
            for traced in builder.edges() {
                if edges.iter().any(|e| e.line == traced.line) {
                    if let Some(pos) = edges
                        .iter()
                        .position(|e| e.line == traced.line && e.front == traced.front)
                    {
                        edges_in_sector.push(pos);
                    }
                } else {
                    has_existing_lines = true;
                    if self.line(traced.line).and_then(|l| l.side(traced.front)).is_some() {
                        has_existing_sides = true;
                    }
                }
            }

            // Loose geometry dropped inside a void must not fill the void
            if existing_only && has_existing_lines && !has_existing_sides {
                trace!("correct_sectors: trace from {:?} is in a void", edge.line);
                continue;
            }

            for pos in edges_in_sector {
                edges[pos].ignore = true;
            }

            if builder.is_valid_sector(self) {
                continue;
            }

            let mut existing = builder.find_existing_sector(self, &sides_correct);
            if let Some(sector) = existing {
                if sectors_reused.contains(&sector) {
                    existing = None;
                } else {
                    sectors_reused.push(sector);
                }
            }
            builder.create_sector(self, existing);
        }

        // ===== PHASE 3: DISCARD UNCLAIMED SIDES =====
        for edge in edges.iter().filter(|e| !e.ignore) {
            if let Some(side) = self.line(edge.line).and_then(|l| l.side(edge.front)) {
                self.remove_side(side, true);
            }
        }

        for &id in lines {
            if self.line_back_sector(id).is_some() && self.line_front_sector(id).is_none() {
                // The line is live (it has a back sector)
                let _ = self.flip_line(id, true);
            }
        }

        // ===== PHASE 4: PROPERTIES FOR NEW SECTORS =====
        let sector_copy = lines.iter().find_map(|&id| {
            [self.line_front_sector(id), self.line_back_sector(id)]
                .into_iter()
                .flatten()
                .find(|s| prior_sectors.contains(s))
        });

        let new_sectors: Vec<SectorId> = self
            .sectors
            .iter()
            .copied()
            .filter(|s| !prior_sectors.contains(s))
            .collect();
        for &sector in &new_sectors {
            if !self.sector(sector).is_some_and(|s| s.is_blank()) {
                continue;
            }
            match sector_copy {
                Some(copy) => self.copy_sector_properties(sector, copy),
                None => {
                    let _ = self.apply_sector_defaults(sector);
                }
            }
        }

        // ===== PHASE 5: TEXTURES FOR NEW SIDES =====
        let new_sides: Vec<SideId> = self
            .sides
            .iter()
            .copied()
            .filter(|s| !prior_sides.contains(s))
            .collect();
        for &side in &new_sides {
            let Some(line_id) = self.side(side).and_then(|s| s.line) else {
                continue;
            };
            self.clear_unneeded_textures(line_id);

            let Some(line) = self.line(line_id) else {
                continue;
            };
            let (v1, v2) = (line.v1, line.v2);
            let one_sided_front = line.side1 == Some(side) && line.side2.is_none();
            let blank_middle = self.side(side).is_some_and(|s| s.tex_middle == NO_TEXTURE);
            if !one_sided_front || !blank_middle {
                continue;
            }

            let mut texture = self.adjacent_line_texture(v1, TextureParts::ALL);
            if texture == NO_TEXTURE {
                texture = self.adjacent_line_texture(v2, TextureParts::ALL);
            }
            if texture == NO_TEXTURE {
                texture = self.config.side_defaults.texture_middle.clone();
            }
            self.set_side_texture(side, SidePart::Middle, &texture);
            self.touch::<Side>(side);
        }

        let removed = self.remove_detached_sectors();
        debug!(
            "correct_sectors: {} lines, {} edges, {} traces, {} new sectors, {} new sides, {} sectors removed",
            lines.len(),
            edges.len(),
            runs,
            new_sectors.len(),
            new_sides.len(),
            removed
        );
    }

    /// True if both sides of `line` reference the same live sector and that
    /// sector covers the area on either side of the line
    fn line_inside_own_sector(&self, line: LineId) -> bool {
        let (Some(front), Some(back)) = (self.line_front_sector(line), self.line_back_sector(line))
        else {
            return false;
        };
        if front != back {
            return false;
        }
        let Some(mid) = self.line_midpoint(line) else {
            return false;
        };
        let offset = self.line_front_vector(line) * SIDE_SAMPLE_OFFSET;
        self.sector_contains(front, mid + offset) && self.sector_contains(front, mid - offset)
    }

    /// Re-derive the sectors on both sides of one line by probing outwards
    /// from its midpoint.
    ///
    /// Returns true if either side changed.
    pub fn correct_line_sectors(&mut self, line: LineId) -> bool {
        let Some(current) = self.line(line).map(|l| (l.side1, l.side2)) else {
            return false;
        };
        let mut changed = false;

        for (front, side) in [(true, current.0), (false, current.1)] {
            let wanted = self.line_side_sector(line, front);
            let existing = side.and_then(|s| self.side(s)).and_then(|s| s.sector);
            if wanted == existing {
                continue;
            }
            match wanted {
                Some(sector) => {
                    let _ = self.set_line_sector(line, sector, front);
                }
                None => {
                    let _ = self.clear_line_side(line, front);
                }
            }
            changed = true;
        }

        if changed {
            let back_only = self
                .line(line)
                .is_some_and(|l| l.side1.is_none() && l.side2.is_some());
            if back_only {
                let _ = self.flip_line(line, true);
            }
        }
        changed
    }

    /// The sector the front (or back) of `line` should belong to, judged by
    /// the nearest line hit by a ray cast from the midpoint in that direction
    pub fn line_side_sector(&self, line: LineId, front: bool) -> Option<SectorId> {
        let mid = self.line_midpoint(line)?;
        let normal = self.line_front_vector(line);
        let through: DVec2 = if front { mid + normal } else { mid - normal };
        let through = rotate_point(mid, through, PROBE_ROTATION);

        let (hit, _) = self.nearest_ray_hit(mid, through, self.lines.iter().copied(), line)?;
        let hit_seg = self.line_seg(hit)?;
        let sector = if line_side(mid, &hit_seg) >= 0.0 {
            self.line_front_sector(hit)
        } else {
            self.line_back_sector(hit)
        };

        if sector.is_some() && sector == self.line_sector(line, front) {
            return sector;
        }

        // Work out which side of the hit line faces us by tracing its front
        let mut builder = SectorBuilder::new();
        let traced = builder.trace_sector(self, hit, true).is_ok();
        if traced
            && builder
                .edges()
                .iter()
                .any(|e| e.line == line && e.front == front)
        {
            return self.line_front_sector(hit);
        }
        self.line_back_sector(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_util::{square_lines, square_room};

    #[test]
    fn test_correct_sectors_builds_room() {
        let mut map = LevelMap::default();
        let lines = square_lines(&mut map, 0.0, 0.0, 64.0);

        map.correct_sectors(&lines, false);

        assert_eq!(map.sector_count(), 1);
        assert_eq!(map.side_count(), 4);
        let sector = map.sector_at(DVec2::new(32.0, 32.0)).unwrap();
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 4);
        for &line in &lines {
            assert_eq!(map.line_front_sector(line), Some(sector));
            assert_eq!(map.line(line).unwrap().side2(), None);
            assert_eq!(map.string_property(line, "side1.texturemiddle"), "STARTAN2");
        }
        // New sector takes the configured defaults
        assert_eq!(map.sector(sector).unwrap().ceiling_height(), 128);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_correct_sectors_is_idempotent() {
        let mut map = LevelMap::default();
        let lines = square_lines(&mut map, 0.0, 0.0, 64.0);
        map.correct_sectors(&lines, false);

        let sectors = map.sector_ids().to_vec();
        let sides = map.side_ids().to_vec();
        map.correct_sectors(&lines, false);

        assert_eq!(map.sector_ids(), sectors.as_slice());
        assert_eq!(map.side_ids(), sides.as_slice());
        for &line in &lines {
            assert_eq!(map.line_front_sector(line), Some(sectors[0]));
        }
    }

    #[test]
    fn test_correct_existing_sides_is_idempotent() {
        let mut map = LevelMap::default();
        let lines = square_lines(&mut map, 0.0, 0.0, 64.0);
        map.correct_sectors(&lines, false);

        let sectors = map.sector_ids().to_vec();
        let sides = map.side_ids().to_vec();
        map.correct_sectors(&lines, true);

        assert_eq!(map.sector_ids(), sectors.as_slice());
        assert_eq!(map.side_ids(), sides.as_slice());
        for &line in &lines {
            assert_eq!(map.line_front_sector(line), Some(sectors[0]));
            assert_eq!(map.line(line).unwrap().side2(), None);
        }
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_two_sided_line_across_room_does_not_split() {
        let mut map = LevelMap::default();
        let (room, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        // Split the side walls and join them through the middle of the room
        let west = map.create_vertex(0.0, 32.0, 1.0);
        let east = map.create_vertex(64.0, 32.0, 1.0);
        assert_eq!(map.line_count(), 6);
        let line = map.create_line_between(west, east, false).unwrap();
        map.set_line_sector(line, room, true).unwrap();
        map.set_line_sector(line, room, false).unwrap();

        map.correct_sectors(&[line], true);

        assert_eq!(map.line_count(), 7);
        assert_eq!(map.sector_count(), 1);
        assert_eq!(map.side_count(), 8);
        assert_eq!(map.line_front_sector(line), Some(room));
        assert_eq!(map.line_back_sector(line), Some(room));
        assert_eq!(map.sector_at(DVec2::new(32.0, 16.0)), Some(room));
        assert_eq!(map.sector_at(DVec2::new(32.0, 48.0)), Some(room));
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_two_sided_line_inside_room_does_not_split() {
        let mut map = LevelMap::default();
        let (room, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        let line = map.create_line(16.0, 32.0, 48.0, 32.0, -1.0).unwrap();
        map.set_line_sector(line, room, true).unwrap();
        map.set_line_sector(line, room, false).unwrap();

        map.correct_sectors(&[line], true);

        assert_eq!(map.sector_count(), 1);
        assert_eq!(map.side_count(), 6);
        assert_eq!(map.line_front_sector(line), Some(room));
        assert_eq!(map.line_back_sector(line), Some(room));
        assert_eq!(map.sector_at(DVec2::new(32.0, 10.0)), Some(room));
    }

    #[test]
    fn test_line_in_void_creates_no_sector() {
        let mut map = LevelMap::default();
        square_lines(&mut map, 0.0, 0.0, 64.0);
        let line = map.create_line(16.0, 32.0, 48.0, 32.0, -1.0).unwrap();

        map.correct_sectors(&[line], true);

        assert_eq!(map.sector_count(), 0);
        assert_eq!(map.side_count(), 0);
    }

    #[test]
    fn test_new_sector_copies_neighbour() {
        let mut map = LevelMap::default();
        let (room, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_int_property(room, "lightlevel", 96).unwrap();

        // Second room sharing the right wall of the first
        let wall = lines[2];
        let top = map.create_line(64.0, 64.0, 128.0, 64.0, -1.0).unwrap();
        let right = map.create_line(128.0, 64.0, 128.0, 0.0, -1.0).unwrap();
        let bottom = map.create_line(128.0, 0.0, 64.0, 0.0, -1.0).unwrap();

        map.correct_sectors(&[wall, top, right, bottom], false);

        assert_eq!(map.sector_count(), 2);
        let east = map.sector_at(DVec2::new(96.0, 32.0)).unwrap();
        assert_ne!(east, room);
        assert_eq!(map.sector(east).unwrap().light(), 96);
        assert_eq!(map.line_front_sector(wall), Some(room));
        assert_eq!(map.line_back_sector(wall), Some(east));
        // Two-sided wall needs no middle texture
        assert_eq!(map.string_property(wall, "side2.texturemiddle"), "-");
    }

    #[test]
    fn test_correct_line_sectors() {
        let mut map = LevelMap::default();
        let (room, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        let line = map.create_line(16.0, 32.0, 48.0, 32.0, -1.0).unwrap();

        assert_eq!(map.line_side_sector(line, true), Some(room));
        assert_eq!(map.line_side_sector(line, false), Some(room));

        assert!(map.correct_line_sectors(line));
        assert_eq!(map.line_front_sector(line), Some(room));
        assert_eq!(map.line_back_sector(line), Some(room));
        assert!(!map.correct_line_sectors(line));
    }

    #[test]
    fn test_line_side_sector_outside_map() {
        let mut map = LevelMap::default();
        square_room(&mut map, 0.0, 0.0, 64.0);
        let line = map.create_line(200.0, 0.0, 200.0, 64.0, -1.0).unwrap();

        // Facing away from the room there is nothing to hit
        assert_eq!(map.line_side_sector(line, true), None);
    }
}
