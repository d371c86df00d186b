//! Geometric primitives for planar map editing
//!
//! Points are `glam::DVec2`. On top of that this crate provides directed
//! segments, axis-aligned boxes, inclined planes, and the distance,
//! intersection and containment tests used by the map engine.
//!
//! Coordinates are y-up. The "front" of a directed segment is the half-plane
//! to the right of `p1 -> p2`.

mod bbox;
mod math;
mod plane;
mod seg;

pub use bbox::BBox;
pub use glam::DVec2;
pub use math::{
    angle_ccw, distance_ray_line, distance_to_line, line_side, lines_intersect,
    point_in_polygon, polygon_signed_area, rotate_point, round_position,
};
pub use plane::Plane;
pub use seg::Seg2;
