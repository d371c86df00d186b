//! Lazily computed line and sector geometry.
//!
//! Line length/direction and sector outlines are stored in `OnceCell`s on
//! the entities. Reads fill them on first use; every mutation that moves a
//! vertex, changes a side's sector or changes a line's endpoints resets the
//! affected cells before returning.

use glam::DVec2;
use planar_geometry::{BBox, Seg2};

use super::LevelMap;
use crate::entities::{Line, LineGeometry, Sector, SectorShape};
use crate::types::{LineId, SectorId};

/// Projections closer than this to an endpoint are clamped away from it
const ENDPOINT_CLAMP: f64 = 0.00001;

impl LevelMap {
    // ========================================================================
    // Lines
    // ========================================================================

    /// Cached length, direction and front vector of a line
    pub fn line_geometry(&self, id: LineId) -> Option<LineGeometry> {
        let line = self.line(id)?;
        let seg = self.line_seg(id)?;
        Some(*line.geometry.get_or_init(|| {
            let length = seg.length();
            let (ca, sa) = if length > 0.0 {
                let d = seg.delta() / length;
                (d.x, d.y)
            } else {
                (0.0, 0.0)
            };
            LineGeometry {
                length,
                ca,
                sa,
                front: seg.front_normal(),
            }
        }))
    }

    pub fn line_length(&self, id: LineId) -> f64 {
        self.line_geometry(id).map_or(0.0, |g| g.length)
    }

    /// Unit vector perpendicular to the line, pointing into its front side
    pub fn line_front_vector(&self, id: LineId) -> DVec2 {
        self.line_geometry(id).map_or(DVec2::ZERO, |g| g.front)
    }

    /// Distance from `point` to the line.
    ///
    /// The projection is clamped slightly inside the segment so that a point
    /// exactly at an endpoint still measures a tiny non-zero distance along
    /// the line's normal direction.
    pub fn line_distance_to(&self, id: LineId, point: DVec2) -> f64 {
        let (Some(seg), Some(geometry)) = (self.line_seg(id), self.line_geometry(id)) else {
            return f64::MAX;
        };
        if geometry.length <= 0.0 {
            return point.distance(seg.p1);
        }

        let dir = DVec2::new(geometry.ca, geometry.sa);
        let max = (geometry.length - ENDPOINT_CLAMP).max(ENDPOINT_CLAMP);
        let t = (point - seg.p1).dot(dir).clamp(ENDPOINT_CLAMP, max);
        point.distance(seg.p1 + dir * t)
    }

    /// Drop the cached geometry of a line and of the sectors on both sides
    pub(crate) fn invalidate_line(&mut self, id: LineId) {
        let Some(line) = self.store.get_mut::<Line>(id) else {
            return;
        };
        line.reset_geometry();
        let sides = [line.side1, line.side2];
        for side in sides.into_iter().flatten() {
            if let Some(sector) = self.side(side).and_then(|s| s.sector) {
                self.invalidate_sector(sector);
            }
        }
    }

    pub(crate) fn invalidate_sector(&mut self, id: SectorId) {
        if let Some(sector) = self.store.get_mut::<Sector>(id) {
            sector.reset_shape();
        }
    }

    /// Invalidate every line touching a vertex modified after `since`
    pub fn update_geometry_info(&mut self, since: u64) {
        let stale: Vec<_> = self
            .vertices()
            .filter(|v| v.modified > since)
            .flat_map(|v| v.connected_lines.iter().copied())
            .collect();
        for line in stale {
            self.invalidate_line(line);
        }
    }

    // ========================================================================
    // Sectors
    // ========================================================================

    /// Cached boundary of a sector, built on first use
    pub fn sector_shape(&self, id: SectorId) -> Option<&SectorShape> {
        let sector = self.store.get::<Sector>(id)?;
        Some(sector.shape.get_or_init(|| self.build_sector_shape(sector)))
    }

    pub fn sector_bbox(&self, id: SectorId) -> Option<BBox> {
        self.sector_shape(id).map(|shape| shape.bbox)
    }

    /// Closed boundary loops of a sector
    pub fn sector_outlines(&self, id: SectorId) -> &[Vec<DVec2>] {
        match self.sector_shape(id) {
            Some(shape) => &shape.outlines,
            None => &[],
        }
    }

    /// Even-odd containment test against every edge of the sector.
    ///
    /// Two-sided lines with the sector on both sides contribute two crossings
    /// and cancel out.
    pub fn sector_contains(&self, id: SectorId, point: DVec2) -> bool {
        let Some(shape) = self.sector_shape(id) else {
            return false;
        };
        if !shape.bbox.contains(point) {
            return false;
        }

        let mut inside = false;
        for edge in &shape.edges {
            let (a, b) = (edge.p1, edge.p2);
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn build_sector_shape(&self, sector: &Sector) -> SectorShape {
        let mut edges = Vec::new();
        let mut bbox = BBox::EMPTY;

        for &side_id in &sector.connected_sides {
            let Some(line_id) = self.side(side_id).and_then(|s| s.line) else {
                continue;
            };
            let Some(line) = self.line(line_id) else {
                continue;
            };
            let (Some(p1), Some(p2)) = (self.vertex_position(line.v1), self.vertex_position(line.v2))
            else {
                continue;
            };

            // Orient each edge so the sector is on its right
            let edge = if line.side1 == Some(side_id) {
                Seg2::new(p1, p2)
            } else {
                Seg2::new(p2, p1)
            };
            bbox.extend(edge.p1);
            bbox.extend(edge.p2);
            edges.push(edge);
        }

        SectorShape {
            outlines: chain_outlines(&edges),
            edges,
            bbox,
        }
    }
}

/// Join oriented edges end-to-start into loops. Edges that cannot be closed
/// into a loop end up in an open chain.
fn chain_outlines(edges: &[Seg2]) -> Vec<Vec<DVec2>> {
    let mut used = vec![false; edges.len()];
    let mut outlines = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut outline = vec![edges[start].p1];
        let mut end = edges[start].p2;

        while end != edges[start].p1 {
            let next = (0..edges.len()).find(|&i| !used[i] && edges[i].p1 == end);
            let Some(next) = next else {
                break;
            };
            used[next] = true;
            outline.push(edges[next].p1);
            end = edges[next].p2;
        }
        outlines.push(outline);
    }
    outlines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_util::{square_lines, square_room};

    #[test]
    fn test_line_geometry() {
        let mut map = LevelMap::default();
        let line = map.create_line(0.0, 0.0, 0.0, 64.0, -1.0).unwrap();
        let geometry = map.line_geometry(line).unwrap();
        assert!((geometry.length - 64.0).abs() < 0.001);
        assert!((geometry.sa - 1.0).abs() < 0.001);
        // Front is to the right of the direction of travel
        assert!((geometry.front.x - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_move_vertex_invalidates_line_length() {
        let mut map = LevelMap::default();
        let line = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        assert!((map.line_length(line) - 64.0).abs() < 0.001);

        let v2 = map.line(line).unwrap().v2();
        map.move_vertex(v2, 128.0, 0.0).unwrap();
        assert!((map.line_length(line) - 128.0).abs() < 0.001);
    }

    #[test]
    fn test_distance_to_clamps_inside_segment() {
        let mut map = LevelMap::default();
        let line = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        assert!((map.line_distance_to(line, DVec2::new(32.0, 10.0)) - 10.0).abs() < 0.001);
        let at_end = map.line_distance_to(line, DVec2::new(0.0, 0.0));
        assert!(at_end > 0.0 && at_end < 0.001);
        assert!((map.line_distance_to(line, DVec2::new(-10.0, 0.0)) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_sector_shape_and_containment() {
        let mut map = LevelMap::default();
        let (sector, _) = square_room(&mut map, 0.0, 0.0, 64.0);

        let bbox = map.sector_bbox(sector).unwrap();
        assert_eq!(bbox.min, DVec2::new(0.0, 0.0));
        assert_eq!(bbox.max, DVec2::new(64.0, 64.0));
        assert_eq!(map.sector_outlines(sector).len(), 1);
        assert_eq!(map.sector_outlines(sector)[0].len(), 4);

        assert!(map.sector_contains(sector, DVec2::new(32.0, 32.0)));
        assert!(!map.sector_contains(sector, DVec2::new(100.0, 32.0)));
    }

    #[test]
    fn test_sector_shape_rebuilt_after_move() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        assert!(!map.sector_contains(sector, DVec2::new(100.0, 32.0)));

        // Drag the right-hand wall outwards
        let right = map.line(lines[2]).unwrap();
        let (a, b) = (right.v1(), right.v2());
        map.move_vertex(a, 128.0, 64.0).unwrap();
        map.move_vertex(b, 128.0, 0.0).unwrap();

        assert!(map.sector_contains(sector, DVec2::new(100.0, 32.0)));
    }

    #[test]
    fn test_two_sided_interior_line_cancels() {
        let mut map = LevelMap::default();
        let (sector, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        let inner = map.create_line(16.0, 16.0, 48.0, 48.0, -1.0).unwrap();
        map.set_line_sector(inner, sector, true).unwrap();
        map.set_line_sector(inner, sector, false).unwrap();

        assert!(map.sector_contains(sector, DVec2::new(40.0, 20.0)));
        assert!(map.sector_contains(sector, DVec2::new(20.0, 40.0)));
    }

    #[test]
    fn test_unclosed_edges_chain_open() {
        let mut map = LevelMap::default();
        let lines = square_lines(&mut map, 0.0, 0.0, 64.0);
        let sector = map.create_sector();
        for &line in &lines[..3] {
            map.set_line_sector(line, sector, true).unwrap();
        }
        let outlines = map.sector_outlines(sector);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].len(), 3);
    }
}
