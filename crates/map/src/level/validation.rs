//! Structural consistency checks.
//!
//! Cleanup passes repair degenerate geometry; [`LevelMap::validate`] reports
//! the first remaining violation of the map invariants. Intermediate states
//! inside multi-step edits may fail validation; it is meant to be run once a
//! bulk operation and its cleanup have finished.

use super::LevelMap;
use crate::entities::{Line, MapEntity, Sector, Side, Thing, Vertex};
use crate::types::{LineId, ObjectId, ObjectKind, SectorId, SideId, VertexId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Line {0:?} has the same vertex at both ends")]
    ZeroLengthLine(LineId),

    #[error("Line {line:?} references missing vertex {vertex:?}")]
    MissingVertex { line: LineId, vertex: VertexId },

    #[error("Vertex {vertex:?} and line {line:?} disagree about their connection")]
    VertexLinkMismatch { vertex: VertexId, line: LineId },

    #[error("Line {0:?} has a back side but no front side")]
    BackOnlyLine(LineId),

    #[error("Side {side:?} does not belong to line {line:?}")]
    SideParentMismatch { side: SideId, line: LineId },

    #[error("Side {0:?} is not attached to a live line")]
    DetachedSide(SideId),

    #[error("Side {0:?} references no live sector")]
    SideWithoutSector(SideId),

    #[error("Sector {sector:?} and side {side:?} disagree about their connection")]
    SectorLinkMismatch { sector: SectorId, side: SideId },

    #[error("{kind} {id:?} is stored with index {stored} but sits at {actual}")]
    IndexMismatch {
        kind: ObjectKind,
        id: ObjectId,
        stored: usize,
        actual: usize,
    },
}

impl LevelMap {
    /// Check every relation, index and geometry invariant of the map
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_indices()?;

        for line in self.lines() {
            self.validate_line(line)?;
        }

        for vertex in self.vertices() {
            for &line in &vertex.connected_lines {
                if !self.line(line).is_some_and(|l| l.has_vertex(vertex.id)) {
                    return Err(ValidationError::VertexLinkMismatch { vertex: vertex.id, line });
                }
            }
        }

        for side in self.sides() {
            let line = side.line.ok_or(ValidationError::DetachedSide(side.id))?;
            let attached = self
                .line(line)
                .ok_or(ValidationError::DetachedSide(side.id))?;
            if attached.side1 != Some(side.id) && attached.side2 != Some(side.id) {
                return Err(ValidationError::SideParentMismatch { side: side.id, line });
            }

            let sector = side
                .sector
                .and_then(|s| self.sector(s))
                .ok_or(ValidationError::SideWithoutSector(side.id))?;
            if !sector.connected_sides.contains(&side.id) {
                return Err(ValidationError::SectorLinkMismatch {
                    sector: sector.id,
                    side: side.id,
                });
            }
        }

        for sector in self.sectors() {
            for &side in &sector.connected_sides {
                if self.side(side).and_then(|s| s.sector) != Some(sector.id) {
                    return Err(ValidationError::SectorLinkMismatch { sector: sector.id, side });
                }
            }
        }

        Ok(())
    }

    fn validate_line(&self, line: &Line) -> Result<(), ValidationError> {
        if line.v1 == line.v2 {
            return Err(ValidationError::ZeroLengthLine(line.id));
        }
        for vertex in [line.v1, line.v2] {
            let v = self.vertex(vertex).ok_or(ValidationError::MissingVertex {
                line: line.id,
                vertex,
            })?;
            if !v.connected_lines.contains(&line.id) {
                return Err(ValidationError::VertexLinkMismatch { vertex, line: line.id });
            }
        }
        if line.side1.is_none() && line.side2.is_some() {
            return Err(ValidationError::BackOnlyLine(line.id));
        }
        for side in [line.side1, line.side2].into_iter().flatten() {
            if self.side(side).and_then(|s| s.line) != Some(line.id) {
                return Err(ValidationError::SideParentMismatch { side, line: line.id });
            }
        }
        Ok(())
    }

    fn validate_indices(&self) -> Result<(), ValidationError> {
        check_indices::<Vertex>(self, &self.vertices)?;
        check_indices::<Line>(self, &self.lines)?;
        check_indices::<Side>(self, &self.sides)?;
        check_indices::<Sector>(self, &self.sectors)?;
        check_indices::<Thing>(self, &self.things)
    }
}

fn check_indices<T: MapEntity>(map: &LevelMap, list: &[T::Id]) -> Result<(), ValidationError> {
    for (actual, &id) in list.iter().enumerate() {
        let stored = map.entity_index::<T>(id).unwrap_or(usize::MAX);
        if stored != actual {
            return Err(ValidationError::IndexMismatch {
                kind: T::KIND,
                id: id.into(),
                stored,
                actual,
            });
        }
    }
    Ok(())
}
