//! Sector boundary tracing.
//!
//! [`SectorBuilder`] starts from one side of one line and walks the line
//! graph, always taking the sharpest turn that keeps the region being traced
//! on its right, until it arrives back at the starting edge. A closed
//! clockwise outline bounds a region; an anticlockwise one is an island
//! (the outside of something). Starting from an island, the builder casts a
//! ray east to find the enclosing outline. Once the enclosing outline is
//! known, any islands inside it are traced too, so the final edge list
//! describes the complete boundary of the region.

use std::collections::HashSet;

use glam::DVec2;
use planar_geometry::{BBox, angle_ccw, line_side, point_in_polygon, polygon_signed_area};
use tracing::{trace, warn};

use super::LevelMap;
use crate::types::{LineId, SectorId, SideId, TraceError, VertexId};

/// Upper bound on steps in one outline walk and on outlines per trace
const MAX_TRACE_STEPS: usize = 10_000;

/// One side of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorEdge {
    pub line: LineId,
    /// True for the front side (right of v1 -> v2)
    pub front: bool,
}

impl SectorEdge {
    pub fn new(line: LineId, front: bool) -> Self {
        Self { line, front }
    }
}

/// A single closed walk around part of a region's boundary
#[derive(Debug, Clone)]
struct Outline {
    edges: Vec<SectorEdge>,
    /// Start vertex of each edge, in walk order
    polygon: Vec<DVec2>,
    bbox: BBox,
    /// Vertex with the largest x coordinate
    rightmost: Option<(VertexId, DVec2)>,
    clockwise: bool,
}

impl Outline {
    /// True if `point` lies within the region this outline bounds: inside a
    /// clockwise outline, or outside an island
    fn contains(&self, point: DVec2) -> bool {
        if !self.bbox.contains(point) {
            return !self.clockwise;
        }
        let inside = point_in_polygon(point, &self.polygon);
        if self.clockwise { inside } else { !inside }
    }
}

/// Traces the boundary of the region on one side of a line and turns it into
/// a sector
#[derive(Debug, Clone, Default)]
pub struct SectorBuilder {
    edges: Vec<SectorEdge>,
    /// Vertices that can no longer start an inner trace
    discarded: HashSet<VertexId>,
}

impl SectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges found by the last successful trace
    pub fn edges(&self) -> &[SectorEdge] {
        &self.edges
    }

    // ========================================================================
    // Tracing
    // ========================================================================

    /// Trace the complete boundary of the region on the `front` (or back)
    /// side of `line`.
    ///
    /// Fails if the start edge is invalid, if the walk cannot close, or if the
    /// region is not enclosed by anything.
    pub fn trace_sector(&mut self, map: &LevelMap, line: LineId, front: bool) -> Result<(), TraceError> {
        self.edges.clear();
        self.discarded.clear();
        if map.line(line).is_none() {
            return Err(TraceError::InvalidEdge);
        }

        // ===== PHASE 1: OUTER BOUNDARY =====
        let mut edge = SectorEdge::new(line, front);
        let mut enclosed = false;
        for _ in 0..MAX_TRACE_STEPS {
            let outline = self.trace_outline(map, edge)?;
            self.edges.extend_from_slice(&outline.edges);
            self.discard_outside_vertices(map, &outline);

            if outline.clockwise {
                enclosed = true;
                break;
            }
            edge = self.find_outer_edge(map, &outline).ok_or(TraceError::OutsideMap)?;
        }
        if !enclosed {
            warn!("SectorBuilder::trace_sector: outer boundary not found within limit");
            return Err(TraceError::IterationLimit);
        }

        // ===== PHASE 2: ISLANDS =====
        for _ in 0..MAX_TRACE_STEPS {
            let Some(edge) = self.find_inner_edge(map) else {
                break;
            };
            let Ok(outline) = self.trace_outline(map, edge) else {
                break;
            };
            self.edges.extend_from_slice(&outline.edges);
            self.discard_outside_vertices(map, &outline);
        }

        trace!(
            "SectorBuilder::trace_sector: {:?} front={} -> {} edges",
            line,
            front,
            self.edges.len()
        );
        Ok(())
    }

    /// Walk one closed outline starting at `start`
    fn trace_outline(&mut self, map: &LevelMap, start: SectorEdge) -> Result<Outline, TraceError> {
        let mut outline = Outline {
            edges: Vec::new(),
            polygon: Vec::new(),
            bbox: BBox::EMPTY,
            rightmost: None,
            clockwise: false,
        };
        let mut visited = HashSet::new();
        let mut edge = start;

        for _ in 0..MAX_TRACE_STEPS {
            let line = map.line(edge.line).ok_or(TraceError::InvalidEdge)?;
            if !visited.insert(edge) {
                return Err(TraceError::RepeatedEdge);
            }

            let (v_start, v_end) = if edge.front {
                (line.v1, line.v2)
            } else {
                (line.v2, line.v1)
            };
            let p_start = map.vertex_position(v_start).ok_or(TraceError::InvalidEdge)?;
            outline.edges.push(edge);
            outline.polygon.push(p_start);
            outline.bbox.extend(p_start);
            if outline.rightmost.is_none_or(|(_, p)| p_start.x > p.x) {
                outline.rightmost = Some((v_start, p_start));
            }
            self.discarded.insert(v_start);

            let next = next_edge(map, edge, v_start, v_end).ok_or(TraceError::InvalidEdge)?;
            if next == start {
                outline.clockwise = polygon_signed_area(&outline.polygon) < 0.0;
                return Ok(outline);
            }
            edge = next;
        }

        Err(TraceError::IterationLimit)
    }

    /// Discard every vertex not within the region bounded by `outline`
    fn discard_outside_vertices(&mut self, map: &LevelMap, outline: &Outline) {
        for vertex in map.vertices() {
            if !self.discarded.contains(&vertex.id) && !outline.contains(vertex.position) {
                self.discarded.insert(vertex.id);
            }
        }
    }

    /// The nearest line side east of an island's rightmost vertex
    fn find_outer_edge(&self, map: &LevelMap, outline: &Outline) -> Option<SectorEdge> {
        let (_, origin) = outline.rightmost?;

        let mut nearest: Option<(LineId, f64)> = None;
        for line in map.lines() {
            let Some(seg) = map.line_seg(line.id) else {
                continue;
            };
            let (a, b) = (seg.p1, seg.p2);

            if a.x <= origin.x && b.x <= origin.x {
                continue;
            }
            if a.y == b.y {
                continue;
            }
            if origin.y < a.y.min(b.y) || origin.y > a.y.max(b.y) {
                continue;
            }

            let x = a.x + (origin.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x > origin.x && nearest.is_none_or(|(_, min)| x < min) {
                nearest = Some((line.id, x));
            }
        }

        let (line, _) = nearest?;
        let seg = map.line_seg(line)?;
        Some(SectorEdge::new(line, line_side(origin, &seg) >= 0.0))
    }

    /// An edge of an island inside the traced region, starting from the
    /// rightmost vertex not yet discarded
    fn find_inner_edge(&mut self, map: &LevelMap) -> Option<SectorEdge> {
        for _ in 0..MAX_TRACE_STEPS {
            let mut rightmost: Option<(VertexId, DVec2)> = None;
            for vertex in map.vertices() {
                if self.discarded.contains(&vertex.id) {
                    continue;
                }
                if vertex.connected_lines.is_empty() {
                    self.discarded.insert(vertex.id);
                    continue;
                }
                if rightmost.is_none_or(|(_, p)| vertex.position.x > p.x) {
                    rightmost = Some((vertex.id, vertex.position));
                }
            }
            let (vertex_id, origin) = rightmost?;

            // The first line counter-clockwise from east has the region on its right
            let mut best: Option<(LineId, f64)> = None;
            for &line_id in map.vertex(vertex_id)?.connected_lines() {
                let Some(line) = map.line(line_id) else {
                    continue;
                };
                let Some(other) = map.vertex_position(line.other_vertex(vertex_id)) else {
                    continue;
                };
                if other == origin {
                    continue;
                }
                let angle = angle_ccw(DVec2::X, other - origin);
                if best.is_none_or(|(_, min)| angle < min) {
                    best = Some((line_id, angle));
                }
            }

            match best {
                Some((line_id, _)) => {
                    let front = map.line(line_id)?.v1 == vertex_id;
                    return Some(SectorEdge::new(line_id, front));
                }
                None => {
                    self.discarded.insert(vertex_id);
                }
            }
        }
        None
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// True if every traced edge already references the same sector and that
    /// sector has no other sides
    pub fn is_valid_sector(&self, map: &LevelMap) -> bool {
        let Some(first) = self.edges.first() else {
            return false;
        };
        let Some(sector) = map.line_sector(first.line, first.front) else {
            return false;
        };
        if self
            .edges
            .iter()
            .any(|e| map.line_sector(e.line, e.front) != Some(sector))
        {
            return false;
        }
        map.sector(sector)
            .is_some_and(|s| s.connected_sides().len() == self.edges.len())
    }

    /// A sector already referenced by one of the traced edges' sides.
    ///
    /// Sides outside `sides_correct` (pre-existing geometry) take priority;
    /// otherwise the first sector found on a side in `sides_correct` is used.
    pub fn find_existing_sector(&self, map: &LevelMap, sides_correct: &[SideId]) -> Option<SectorId> {
        let mut fallback = None;
        for edge in &self.edges {
            let Some(side) = map.line(edge.line).and_then(|l| l.side(edge.front)) else {
                continue;
            };
            let Some(sector) = map.side(side).and_then(|s| s.sector) else {
                continue;
            };
            if !sides_correct.contains(&side) {
                return Some(sector);
            }
            if fallback.is_none() {
                fallback = Some(sector);
            }
        }
        fallback
    }

    /// A sector to copy properties from: the first one referenced by a
    /// traced edge's own side
    pub fn find_copy_sector(&self, map: &LevelMap) -> Option<SectorId> {
        self.edges
            .iter()
            .find_map(|e| map.line_sector(e.line, e.front))
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Assign every traced edge to `existing`, or to a new sector.
    ///
    /// A new sector copies the properties of [`Self::find_copy_sector`] when
    /// there is one and is left blank otherwise.
    pub fn create_sector(&self, map: &mut LevelMap, existing: Option<SectorId>) -> SectorId {
        let sector = match existing {
            Some(sector) => sector,
            None => {
                let copy = self.find_copy_sector(map);
                let sector = map.create_sector();
                if let Some(copy) = copy {
                    map.copy_sector_properties(sector, copy);
                }
                sector
            }
        };

        for edge in &self.edges {
            // Edges came from live lines and the sector was just resolved
            let _ = map.set_line_sector(edge.line, sector, edge.front);
        }
        trace!(
            "SectorBuilder::create_sector: {:?} ({} edges, reused={})",
            sector,
            self.edges.len(),
            existing.is_some()
        );
        sector
    }
}

/// The edge that continues the walk after `edge` arrives at `v_end`.
///
/// Candidates are ranked by counter-clockwise angle from the direction back
/// along `edge`; the smallest wins. A line doubling straight back over `edge`
/// ranks last. With no other line at `v_end` the walk turns around onto the
/// other side of the same line.
fn next_edge(map: &LevelMap, edge: SectorEdge, v_start: VertexId, v_end: VertexId) -> Option<SectorEdge> {
    let origin = map.vertex_position(v_end)?;
    let back = map.vertex_position(v_start)? - origin;

    let mut best: Option<(LineId, f64)> = None;
    for &line_id in map.vertex(v_end)?.connected_lines() {
        if line_id == edge.line {
            continue;
        }
        let Some(line) = map.line(line_id) else {
            continue;
        };
        if line.v1 == line.v2 {
            continue;
        }
        let Some(next) = map.vertex_position(line.other_vertex(v_end)) else {
            continue;
        };
        let mut angle = angle_ccw(back, next - origin);
        if angle == 0.0 {
            angle = std::f64::consts::TAU;
        }
        if best.is_none_or(|(_, min)| angle < min) {
            best = Some((line_id, angle));
        }
    }

    match best {
        Some((line_id, _)) => {
            let front = map.line(line_id)?.v1 == v_end;
            Some(SectorEdge::new(line_id, front))
        }
        None => Some(SectorEdge::new(edge.line, !edge.front)),
    }
}
