//! Cleanup passes for degenerate geometry and dangling references, plus
//! index and back-reference rebuilding.

use tracing::info;

use super::LevelMap;
use crate::entities::{Line, MapEntity, Sector, Side, Vertex};
use crate::store::ObjectStore;

/// Counts of objects removed by [`LevelMap::map_open_checks`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub detached_vertices: usize,
    pub detached_sides: usize,
    pub detached_sectors: usize,
    pub zero_length_lines: usize,
    pub invalid_sides: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.detached_vertices
            + self.detached_sides
            + self.detached_sectors
            + self.zero_length_lines
            + self.invalid_sides
    }
}

impl LevelMap {
    // ========================================================================
    // Removal passes
    // ========================================================================

    /// Remove vertices with no connected lines
    pub fn remove_detached_vertices(&mut self) -> usize {
        let detached: Vec<_> = self
            .vertices()
            .filter(|v| v.connected_lines.is_empty())
            .map(|v| v.id)
            .collect();
        for &id in detached.iter().rev() {
            // Collected from the live list above
            let _ = self.remove_vertex(id, false);
        }
        self.refresh_indices();
        detached.len()
    }

    /// Remove sides that are not attached to a line
    pub fn remove_detached_sides(&mut self) -> usize {
        let detached: Vec<_> = self
            .sides()
            .filter(|s| s.line.is_none_or(|line| self.line(line).is_none()))
            .map(|s| s.id)
            .collect();
        for &id in detached.iter().rev() {
            self.remove_side(id, false);
        }
        self.refresh_indices();
        detached.len()
    }

    /// Remove sectors that no side references
    pub fn remove_detached_sectors(&mut self) -> usize {
        let detached: Vec<_> = self
            .sectors()
            .filter(|s| s.connected_sides.is_empty())
            .map(|s| s.id)
            .collect();
        for &id in detached.iter().rev() {
            self.remove_sector(id);
        }
        self.refresh_indices();
        detached.len()
    }

    /// Remove lines whose two vertices are the same
    pub fn remove_zero_length_lines(&mut self) -> usize {
        let zero_length: Vec<_> = self
            .lines()
            .filter(|l| l.v1 == l.v2)
            .map(|l| l.id)
            .collect();
        for &id in &zero_length {
            self.remove_line(id);
        }
        zero_length.len()
    }

    /// Remove sides that reference no live sector
    pub fn remove_invalid_sides(&mut self) -> usize {
        let invalid: Vec<_> = self
            .sides()
            .filter(|s| s.sector.is_none_or(|sector| self.sector(sector).is_none()))
            .map(|s| s.id)
            .collect();
        for &id in &invalid {
            self.remove_side(id, true);
        }
        invalid.len()
    }

    /// Run every cleanup pass, in order: detached vertices, detached sides,
    /// detached sectors, zero-length lines, invalid sides
    pub fn map_open_checks(&mut self) -> CleanupReport {
        let report = CleanupReport {
            detached_vertices: self.remove_detached_vertices(),
            detached_sides: self.remove_detached_sides(),
            detached_sectors: self.remove_detached_sectors(),
            zero_length_lines: self.remove_zero_length_lines(),
            invalid_sides: self.remove_invalid_sides(),
        };
        if report.total() > 0 {
            info!(
                "Removed {} detached vertices, {} detached sides, {} detached sectors, {} zero-length lines and {} invalid sides",
                report.detached_vertices,
                report.detached_sides,
                report.detached_sectors,
                report.zero_length_lines,
                report.invalid_sides
            );
        }
        report
    }

    // ========================================================================
    // Rebuilding
    // ========================================================================

    /// Set every live entity's stored index to its position in its collection
    pub fn refresh_indices(&mut self) {
        reindex::<Vertex>(&mut self.store, &self.vertices);
        reindex::<Line>(&mut self.store, &self.lines);
        reindex::<Side>(&mut self.store, &self.sides);
        reindex::<Sector>(&mut self.store, &self.sectors);
        reindex::<crate::entities::Thing>(&mut self.store, &self.things);
    }

    /// Recompute every vertex's connected line list from the lines
    pub fn rebuild_connected_lines(&mut self) {
        for &id in &self.vertices {
            if let Some(vertex) = self.store.get_mut::<Vertex>(id) {
                vertex.connected_lines.clear();
            }
        }
        for &id in &self.lines {
            let Some((v1, v2)) = self.store.get::<Line>(id).map(|l| (l.v1, l.v2)) else {
                continue;
            };
            for v in [v1, v2] {
                if let Some(vertex) = self.store.get_mut::<Vertex>(v) {
                    vertex.connect_line(id);
                }
            }
        }
    }

    /// Recompute every sector's connected side list from the sides
    pub fn rebuild_connected_sides(&mut self) {
        for &id in &self.sectors {
            if let Some(sector) = self.store.get_mut::<Sector>(id) {
                sector.connected_sides.clear();
                sector.reset_shape();
            }
        }
        for &id in &self.sides {
            let Some(sector) = self.store.get::<Side>(id).and_then(|s| s.sector) else {
                continue;
            };
            if let Some(sector) = self.store.get_mut::<Sector>(sector) {
                sector.connected_sides.push(id);
            }
        }
    }
}

fn reindex<T: MapEntity>(store: &mut ObjectStore, list: &[T::Id]) {
    for (index, &id) in list.iter().enumerate() {
        if let Some(object) = store.get_mut::<T>(id) {
            object.set_index(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_util::square_room;

    #[test]
    fn test_remove_detached_vertices_and_sectors() {
        let mut map = LevelMap::default();
        square_room(&mut map, 0.0, 0.0, 64.0);
        map.create_vertex(200.0, 200.0, -1.0);
        map.create_sector();

        assert_eq!(map.remove_detached_vertices(), 1);
        assert_eq!(map.remove_detached_sectors(), 1);
        assert_eq!(map.vertex_count(), 4);
        assert_eq!(map.sector_count(), 1);
        assert_eq!(map.remove_detached_vertices(), 0);
    }

    #[test]
    fn test_remove_detached_sides() {
        let mut map = LevelMap::default();
        let (sector, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.create_side(sector).unwrap();
        assert_eq!(map.side_count(), 5);

        assert_eq!(map.remove_detached_sides(), 1);
        assert_eq!(map.side_count(), 4);
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 4);
    }

    #[test]
    fn test_remove_zero_length_lines() {
        let mut map = LevelMap::default();
        let line = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let v1 = map.line(line).unwrap().v1();
        map.store.get_mut::<Line>(line).unwrap().v2 = v1;

        assert_eq!(map.remove_zero_length_lines(), 1);
        assert_eq!(map.line_count(), 0);
    }

    #[test]
    fn test_remove_invalid_sides() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.remove_sector(sector);

        assert_eq!(map.remove_invalid_sides(), 4);
        assert_eq!(map.side_count(), 0);
        for line in lines {
            assert_eq!(map.line(line).unwrap().side1(), None);
        }
    }

    #[test]
    fn test_map_open_checks() {
        let mut map = LevelMap::default();
        square_room(&mut map, 0.0, 0.0, 64.0);
        map.create_vertex(-50.0, -50.0, -1.0);
        map.create_sector();

        let report = map.map_open_checks();
        assert_eq!(
            report,
            CleanupReport {
                detached_vertices: 1,
                detached_sectors: 1,
                ..Default::default()
            }
        );
        assert_eq!(report.total(), 2);
        assert_eq!(map.map_open_checks(), CleanupReport::default());
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_rebuild_connected_lists() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        let corner = map.line(lines[0]).unwrap().v1();

        map.store.get_mut::<Vertex>(corner).unwrap().connected_lines.clear();
        map.store.get_mut::<Sector>(sector).unwrap().connected_sides.clear();
        map.rebuild_connected_lines();
        map.rebuild_connected_sides();

        assert_eq!(map.vertex(corner).unwrap().connected_lines().len(), 2);
        assert_eq!(map.sector(sector).unwrap().connected_sides().len(), 4);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_refresh_indices() {
        let mut map = LevelMap::default();
        let (_, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.store.get_mut::<Line>(lines[2]).unwrap().index = 0;

        map.refresh_indices();
        assert_eq!(map.line(lines[2]).unwrap().index(), 2);
    }
}
