//! Merging newly placed architecture into the surrounding map.

use planar_geometry::lines_intersect;
use tracing::debug;

use super::LevelMap;
use crate::types::{LineId, VertexId};

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl LevelMap {
    /// Merge the architecture connected to `vertices` into the map.
    ///
    /// Coincident vertices are merged, lines are split where vertices lie on
    /// them or where they cross other lines, overlapping lines are merged,
    /// and the sectors around every affected line are corrected. Returns
    /// true if anything was merged or split.
    pub fn merge_arch(&mut self, vertices: &[VertexId]) -> bool {
        if self.vertices.is_empty() || self.lines.is_empty() {
            return false;
        }

        let (n_vertices, n_lines) = (self.vertices.len(), self.lines.len());
        let (last_vertex, last_line) = (self.vertices.last().copied(), self.lines.last().copied());
        let split_dist = self.config.merge_split_distance;

        // ===== PHASE 1: MERGE VERTICES =====
        let positions: Vec<_> = vertices
            .iter()
            .filter_map(|&v| self.vertex_position(v))
            .collect();
        let mut merged_vertices: Vec<VertexId> = Vec::new();
        for p in positions {
            if let Some(v) = self.merge_vertices_point(p.x, p.y) {
                push_unique(&mut merged_vertices, v);
            }
        }
        let mut connected = self.lines_touching(&merged_vertices);

        // ===== PHASE 2: SPLIT BY VERTICES =====
        for &vertex in &merged_vertices.clone() {
            self.split_lines_at(vertex, split_dist);
        }

        let mut index = 0;
        while index < connected.len() {
            let line = connected[index];
            for vertex in self.vertices.clone() {
                let Some(l) = self.line(line) else {
                    break;
                };
                if l.has_vertex(vertex) {
                    continue;
                }
                let Some(point) = self.vertex_position(vertex) else {
                    continue;
                };
                if self.line_distance_to(line, point) < split_dist {
                    if let Ok(new_line) = self.split_line(line, vertex) {
                        connected.push(new_line);
                        push_unique(&mut merged_vertices, vertex);
                    }
                }
            }
            index += 1;
        }

        // ===== PHASE 3: SPLIT BY INTERSECTIONS =====
        let mut index = 0;
        while index < connected.len() {
            if !self.split_first_crossing(connected[index], &mut connected, &mut merged_vertices) {
                index += 1;
            }
        }

        // ===== PHASE 4: OVERLAPPING LINES =====
        let mut connected = self.lines_touching(&merged_vertices);
        let mut remove_lines: Vec<LineId> = Vec::new();
        for a in 0..connected.len() {
            let line1 = connected[a];
            if remove_lines.contains(&line1) {
                continue;
            }
            for &line2 in &connected[a + 1..] {
                if remove_lines.contains(&line2) {
                    continue;
                }
                let overlapping = match (self.line(line1), self.line(line2)) {
                    (Some(l1), Some(l2)) => l1.overlaps(l2),
                    _ => false,
                };
                if overlapping {
                    let remove = self.merge_overlapping_lines(line2, line1);
                    push_unique(&mut remove_lines, remove);
                    if remove == line1 {
                        break;
                    }
                }
            }
        }
        for &line in &remove_lines {
            debug!("merge_arch: removing overlapping line {:?}", line);
            self.remove_line(line);
        }
        connected.retain(|line| !remove_lines.contains(line));

        let merged = self.vertices.len() != n_vertices
            || self.lines.len() != n_lines
            || self.vertices.last().copied() != last_vertex
            || self.lines.last().copied() != last_line
            || !remove_lines.is_empty();

        // ===== PHASE 5: SECTORS =====
        self.correct_sectors(&connected, true);
        for &line in &connected {
            let back_only = self
                .line(line)
                .is_some_and(|l| l.side1.is_none() && l.side2.is_some());
            if back_only {
                let _ = self.flip_line(line, true);
            }
        }

        debug!(
            "merge_arch: {} vertices, {} lines affected, merged={}",
            merged_vertices.len(),
            connected.len(),
            merged
        );
        merged
    }

    /// Split `line` and the first line it crosses at their intersection.
    ///
    /// Returns true if a split happened; `line` is then shorter and should be
    /// checked again.
    fn split_first_crossing(
        &mut self,
        line: LineId,
        connected: &mut Vec<LineId>,
        merged_vertices: &mut Vec<VertexId>,
    ) -> bool {
        let Some((seg1, a1, a2)) = self
            .line(line)
            .and_then(|l| Some((self.line_seg(line)?, l.v1, l.v2)))
        else {
            return false;
        };

        for other in self.lines.clone() {
            let Some(l2) = self.line(other) else {
                continue;
            };
            if l2.has_vertex(a1) || l2.has_vertex(a2) {
                continue;
            }
            let Some(seg2) = self.line_seg(other) else {
                continue;
            };
            let Some(point) = lines_intersect(&seg1, &seg2) else {
                continue;
            };

            let vertex = self.create_vertex(point.x, point.y, -1.0);
            // A crossing that snaps onto an existing endpoint is not a split
            let at_endpoint = [line, other]
                .iter()
                .any(|&l| self.line(l).is_some_and(|l| l.has_vertex(vertex)));
            if at_endpoint {
                continue;
            }

            merged_vertices.push(vertex);
            if let Ok(new_line) = self.split_line(line, vertex) {
                connected.push(new_line);
            }
            if let Ok(new_line) = self.split_line(other, vertex) {
                connected.push(new_line);
            }
            debug!("merge_arch: lines {:?} and {:?} intersect", line, other);
            return true;
        }
        false
    }

    /// Distinct live lines touching any of `vertices`
    fn lines_touching(&self, vertices: &[VertexId]) -> Vec<LineId> {
        let mut lines = Vec::new();
        for &vertex in vertices {
            if let Some(v) = self.vertex(vertex) {
                for &line in v.connected_lines() {
                    push_unique(&mut lines, line);
                }
            }
        }
        lines
    }

    /// Remove every other line running between the same two vertices as
    /// `line`, then correct its sectors.
    ///
    /// Returns the number of lines removed.
    pub fn merge_line(&mut self, line: LineId) -> usize {
        let Some(v1) = self.line(line).map(|l| l.v1) else {
            return 0;
        };
        let Some(candidates) = self.vertex(v1).map(|v| v.connected_lines().to_vec()) else {
            return 0;
        };

        let mut merged = 0;
        for other in candidates {
            if other == line {
                continue;
            }
            let overlapping = match (self.line(line), self.line(other)) {
                (Some(l1), Some(l2)) => l1.overlaps(l2),
                _ => false,
            };
            if overlapping && self.remove_line(other) {
                merged += 1;
            }
        }

        if merged > 0 {
            self.correct_line_sectors(line);
        }
        merged
    }

    /// Decide which of two overlapping lines to remove and carry its sector
    /// over to the one that stays.
    ///
    /// `line1` is removed if it has a back side and `line2` does not;
    /// otherwise `line2` is. The kept line's front takes the sector the
    /// removed line had on the same side of the shared edge. Returns the
    /// line to remove; the caller removes it.
    pub fn merge_overlapping_lines(&mut self, line1: LineId, line2: LineId) -> LineId {
        let has_back = |map: &LevelMap, id: LineId| map.line(id).is_some_and(|l| l.side2.is_some());
        let (remove, keep) = if has_back(self, line1) && !has_back(self, line2) {
            (line1, line2)
        } else {
            (line2, line1)
        };

        let same_direction = match (self.line(remove), self.line(keep)) {
            (Some(r), Some(k)) => r.v1 == k.v1,
            _ => return remove,
        };
        if let Some(sector) = self.line_sector(remove, same_direction) {
            // Both lines are live
            let _ = self.set_line_sector(keep, sector, true);
        }
        remove
    }
}
