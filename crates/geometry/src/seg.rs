//! Directed line segment.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::BBox;

/// A directed segment from `p1` to `p2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seg2 {
    pub p1: DVec2,
    pub p2: DVec2,
}

impl Seg2 {
    pub fn new(p1: DVec2, p2: DVec2) -> Self {
        Self { p1, p2 }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(DVec2::new(x1, y1), DVec2::new(x2, y2))
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    pub fn delta(&self) -> DVec2 {
        self.p2 - self.p1
    }

    pub fn midpoint(&self) -> DVec2 {
        self.p1 + (self.p2 - self.p1) * 0.5
    }

    /// Unit vector perpendicular to the segment, pointing into its front
    /// half-plane. Zero for a zero-length segment.
    pub fn front_normal(&self) -> DVec2 {
        let d = self.delta();
        DVec2::new(d.y, -d.x).normalize_or_zero()
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.p1, self.p2)
    }

    /// True if `point` is inside the segment's bounding box (inclusive)
    pub fn bbox_contains(&self, point: DVec2) -> bool {
        self.bbox().contains(point)
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.p2, self.p1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_midpoint() {
        let seg = Seg2::from_coords(0.0, 0.0, 3.0, 4.0);
        assert!((seg.length() - 5.0).abs() < 0.001);
        assert_eq!(seg.midpoint(), DVec2::new(1.5, 2.0));
    }

    #[test]
    fn test_front_normal_points_right() {
        // Going up the y axis, the right-hand side is +x
        let seg = Seg2::from_coords(0.0, 0.0, 0.0, 64.0);
        let n = seg.front_normal();
        assert!((n.x - 1.0).abs() < 0.001);
        assert!(n.y.abs() < 0.001);
    }

    #[test]
    fn test_zero_length_normal() {
        let seg = Seg2::from_coords(5.0, 5.0, 5.0, 5.0);
        assert_eq!(seg.front_normal(), DVec2::ZERO);
    }
}
