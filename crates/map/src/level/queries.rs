//! Spatial queries: nearest objects, containment, and line intersections.

use glam::DVec2;
use planar_geometry::{BBox, Seg2, distance_ray_line, distance_to_line, line_side, lines_intersect};

use super::LevelMap;
use crate::types::{LineId, SectorId, ThingId, VertexId};

impl LevelMap {
    // ========================================================================
    // Nearest object
    // ========================================================================

    /// Nearest vertex to `point` no further than `max_dist`.
    ///
    /// The nearest vertex is picked by Manhattan distance; only that one is
    /// then checked against `max_dist` with the real distance.
    pub fn nearest_vertex(&self, point: DVec2, max_dist: f64) -> Option<VertexId> {
        let (id, position) = manhattan_nearest(self.vertices().map(|v| (v.id, v.position)), point)?;
        (position.distance(point) <= max_dist).then_some(id)
    }

    /// Nearest line to `point` no further than `max_dist`
    pub fn nearest_line(&self, point: DVec2, max_dist: f64) -> Option<LineId> {
        let mut min = max_dist;
        let mut nearest = None;
        for line in self.lines() {
            let Some(seg) = self.line_seg(line.id) else {
                continue;
            };
            if !seg.bbox().expanded(min).contains(point) {
                continue;
            }
            let dist = distance_to_line(point, &seg);
            if dist < min {
                min = dist;
                nearest = Some(line.id);
            }
        }
        nearest
    }

    /// Nearest thing to `point` no further than `max_dist`, picked the same
    /// way as [`LevelMap::nearest_vertex`]
    pub fn nearest_thing(&self, point: DVec2, max_dist: f64) -> Option<ThingId> {
        let (id, position) = manhattan_nearest(self.things().map(|t| (t.id, t.position)), point)?;
        (position.distance(point) <= max_dist).then_some(id)
    }

    /// Every thing sharing the minimum distance to `point` (stacked things)
    pub fn nearest_thing_multi(&self, point: DVec2) -> Vec<ThingId> {
        let mut min = f64::MAX;
        let mut nearest = Vec::new();
        for thing in self.things() {
            let dist = thing.position.distance(point);
            if dist < min {
                min = dist;
                nearest.clear();
                nearest.push(thing.id);
            } else if dist == min {
                nearest.push(thing.id);
            }
        }
        nearest
    }

    // ========================================================================
    // Containment and lookup
    // ========================================================================

    /// The first sector containing `point`
    pub fn sector_at(&self, point: DVec2) -> Option<SectorId> {
        self.sectors
            .iter()
            .copied()
            .find(|&sector| self.sector_contains(sector, point))
    }

    /// Vertex at exactly `(x, y)`
    pub fn vertex_at(&self, x: f64, y: f64) -> Option<VertexId> {
        let point = DVec2::new(x, y);
        self.vertices()
            .find(|v| v.position == point)
            .map(|v| v.id)
    }

    /// Bounding box of every vertex
    pub fn map_bbox(&self) -> BBox {
        let mut bbox = BBox::EMPTY;
        for vertex in self.vertices() {
            bbox.extend(vertex.position);
        }
        bbox
    }

    // ========================================================================
    // Intersections
    // ========================================================================

    /// Points where the segment `p1 -> p2` crosses map lines, ordered from
    /// `p1` along the segment's dominant axis
    pub fn cut_lines(&self, p1: DVec2, p2: DVec2) -> Vec<DVec2> {
        let cutter = Seg2::new(p1, p2);
        let mut points: Vec<DVec2> = self
            .lines
            .iter()
            .filter_map(|&line| self.line_seg(line))
            .filter_map(|seg| lines_intersect(&cutter, &seg))
            .collect();

        let d = cutter.delta();
        if d.x.abs() > d.y.abs() {
            let sign = d.x.signum();
            points.sort_by(|a, b| (a.x * sign).total_cmp(&(b.x * sign)));
        } else {
            let sign = d.y.signum();
            points.sort_by(|a, b| (a.y * sign).total_cmp(&(b.y * sign)));
        }
        points
    }

    /// The vertex closest to `p1` lying on the segment `p1 -> p2`, endpoints
    /// excluded
    pub fn line_cross_vertex(&self, p1: DVec2, p2: DVec2) -> Option<VertexId> {
        let seg = Seg2::new(p1, p2);
        let bbox = seg.bbox();

        let mut nearest = None;
        let mut min = f64::MAX;
        for vertex in self.vertices() {
            let p = vertex.position;
            if !bbox.contains(p) || p == p1 || p == p2 {
                continue;
            }
            if line_side(p, &seg) != 0.0 {
                continue;
            }
            let dist = p.distance(p1);
            if dist < min {
                min = dist;
                nearest = Some(vertex.id);
            }
        }
        nearest
    }

    /// Intersection point of two lines, endpoints included
    pub fn lines_intersect(&self, a: LineId, b: LineId) -> Option<DVec2> {
        lines_intersect(&self.line_seg(a)?, &self.line_seg(b)?)
    }

    /// Cast a ray from the midpoint of `line` along the normal of its front
    /// (or back) side and return the nearest line of that side's sector it
    /// hits, with the hit point
    pub fn line_vector_intersect(&self, line: LineId, front: bool) -> Option<(LineId, DVec2)> {
        let sector = self.line_sector(line, front)?;
        let mid = self.line_midpoint(line)?;
        let normal = if front {
            self.line_front_vector(line)
        } else {
            -self.line_front_vector(line)
        };
        self.nearest_ray_hit(mid, mid + normal, self.sector_lines(sector), line)
    }

    /// Nearest line from `candidates` (other than `exclude`) hit by the ray
    /// `origin -> through`, measured in ray lengths
    pub(crate) fn nearest_ray_hit(
        &self,
        origin: DVec2,
        through: DVec2,
        candidates: impl IntoIterator<Item = LineId>,
        exclude: LineId,
    ) -> Option<(LineId, DVec2)> {
        let mut best: Option<(LineId, f64)> = None;
        for candidate in candidates {
            if candidate == exclude {
                continue;
            }
            let Some(seg) = self.line_seg(candidate) else {
                continue;
            };
            let Some(t) = distance_ray_line(origin, through, seg.p1, seg.p2) else {
                continue;
            };
            if t > 0.0 && best.is_none_or(|(_, min)| t < min) {
                best = Some((candidate, t));
            }
        }
        best.map(|(line, t)| (line, origin + (through - origin) * t))
    }

    /// A point inside `sector`, suitable for placing a label.
    ///
    /// Uses the bounding box centre when it lies inside the sector. Otherwise
    /// casts a ray inwards from the boundary line nearest the centre and
    /// returns the point halfway to the first line it hits.
    pub fn find_sector_text_point(&self, sector: SectorId) -> Option<DVec2> {
        let bbox = self.sector_bbox(sector)?;
        if !bbox.is_valid() {
            return None;
        }
        let mid = bbox.mid();
        if self.sector_contains(sector, mid) {
            return Some(mid);
        }

        // Boundary side whose line is nearest the centre
        let mut nearest: Option<(LineId, bool, f64)> = None;
        for &side in self.sector(sector)?.connected_sides() {
            let Some(line) = self.side(side).and_then(|s| s.line) else {
                continue;
            };
            let Some(seg) = self.line_seg(line) else {
                continue;
            };
            let dist = distance_to_line(mid, &seg);
            if nearest.is_none_or(|(_, _, min)| dist < min) {
                let front = self.line(line).is_some_and(|l| l.side1 == Some(side));
                nearest = Some((line, front, dist));
            }
        }
        let (line, front, _) = nearest?;

        let start = self.line_midpoint(line)?;
        let normal = if front {
            self.line_front_vector(line)
        } else {
            -self.line_front_vector(line)
        };
        match self.nearest_ray_hit(start, start + normal, self.sector_lines(sector), line) {
            Some((_, hit)) => Some(start + (hit - start) * 0.5),
            None => Some(start),
        }
    }
}

/// First candidate with the smallest Manhattan distance to `point`
fn manhattan_nearest<I: Copy>(candidates: impl Iterator<Item = (I, DVec2)>, point: DVec2) -> Option<(I, DVec2)> {
    let mut min = f64::MAX;
    let mut nearest = None;
    for (id, position) in candidates {
        let d = (position - point).abs();
        let dist = d.x + d.y;
        if dist < min {
            min = dist;
            nearest = Some((id, position));
        }
    }
    nearest
}
