//! Distance, intersection, angle and containment functions.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::Seg2;

/// Which side of `seg` the point lies on.
///
/// Positive (or zero) is the front (right of `p1 -> p2`), negative the back.
/// The magnitude is twice the area of the triangle `p1, p2, point`.
pub fn line_side(point: DVec2, seg: &Seg2) -> f64 {
    (point.x - seg.p1.x) * (seg.p2.y - seg.p1.y) - (point.y - seg.p1.y) * (seg.p2.x - seg.p1.x)
}

/// Exact distance from `point` to the closest point on `seg`
pub fn distance_to_line(point: DVec2, seg: &Seg2) -> f64 {
    let d = seg.delta();
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
        return point.distance(seg.p1);
    }
    let t = ((point - seg.p1).dot(d) / len_sq).clamp(0.0, 1.0);
    point.distance(seg.p1 + d * t)
}

/// Intersection point of two segments, endpoints included.
///
/// Parallel and collinear segments never intersect.
pub fn lines_intersect(a: &Seg2, b: &Seg2) -> Option<DVec2> {
    let da = a.delta();
    let db = b.delta();
    let denom = da.perp_dot(db);
    if denom == 0.0 {
        return None;
    }

    let diff = b.p1 - a.p1;
    let ua = diff.perp_dot(db) / denom;
    let ub = diff.perp_dot(da) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(a.p1 + da * ua)
    } else {
        None
    }
}

/// Distance along the ray `r1 -> r2` to the segment `s1 -> s2`, measured in
/// multiples of `|r2 - r1|`. Returns `None` if the ray misses the segment or
/// the segment lies behind the ray origin.
pub fn distance_ray_line(r1: DVec2, r2: DVec2, s1: DVec2, s2: DVec2) -> Option<f64> {
    let dr = r2 - r1;
    let ds = s2 - s1;
    let denom = dr.perp_dot(ds);
    if denom == 0.0 {
        return None;
    }

    let diff = s1 - r1;
    let t = diff.perp_dot(ds) / denom;
    let u = diff.perp_dot(dr) / denom;
    if (0.0..=1.0).contains(&u) && t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Rotates `point` counter-clockwise around `origin` by `angle` radians
pub fn rotate_point(origin: DVec2, point: DVec2, angle: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    let p = point - origin;
    origin + DVec2::new(p.x * c - p.y * s, p.x * s + p.y * c)
}

/// Counter-clockwise angle in `[0, TAU)` from direction `from` to direction `to`
pub fn angle_ccw(from: DVec2, to: DVec2) -> f64 {
    let a = from.y.atan2(from.x);
    let b = to.y.atan2(to.x);
    let angle = (b - a).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if angle >= TAU { 0.0 } else { angle }
}

/// Rounds a map coordinate to the nearest integer
pub fn round_position(value: f64) -> f64 {
    value.round()
}

/// Even-odd containment test against a closed polygon outline
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pi.x + (point.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace signed area. Positive for counter-clockwise outlines (y-up).
pub fn polygon_signed_area(polygon: &[DVec2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        sum += polygon[j].perp_dot(polygon[i]);
        j = i;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(64.0, 0.0),
            DVec2::new(64.0, 64.0),
            DVec2::new(0.0, 64.0),
        ]
    }

    #[test]
    fn test_line_side_front_is_right() {
        let seg = Seg2::from_coords(0.0, 0.0, 0.0, 64.0);
        assert!(line_side(DVec2::new(10.0, 10.0), &seg) > 0.0);
        assert!(line_side(DVec2::new(-10.0, 10.0), &seg) < 0.0);
        assert_eq!(line_side(DVec2::new(0.0, 100.0), &seg), 0.0);
    }

    #[test]
    fn test_distance_to_line_clamps_to_endpoints() {
        let seg = Seg2::from_coords(0.0, 0.0, 10.0, 0.0);
        assert!((distance_to_line(DVec2::new(5.0, 3.0), &seg) - 3.0).abs() < 0.001);
        assert!((distance_to_line(DVec2::new(13.0, 4.0), &seg) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_lines_intersect_crossing() {
        let a = Seg2::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Seg2::from_coords(0.0, 10.0, 10.0, 0.0);
        let p = lines_intersect(&a, &b).unwrap();
        assert!((p.x - 5.0).abs() < 0.001);
        assert!((p.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_lines_intersect_parallel_and_apart() {
        let a = Seg2::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = Seg2::from_coords(0.0, 5.0, 10.0, 5.0);
        assert!(lines_intersect(&a, &b).is_none());

        let c = Seg2::from_coords(20.0, -5.0, 20.0, 5.0);
        assert!(lines_intersect(&a, &c).is_none());
    }

    #[test]
    fn test_distance_ray_line() {
        let origin = DVec2::new(0.0, 0.0);
        let dir = DVec2::new(1.0, 0.0);
        let hit = distance_ray_line(origin, origin + dir, DVec2::new(7.0, -1.0), DVec2::new(7.0, 1.0));
        assert!((hit.unwrap() - 7.0).abs() < 0.001);

        // Behind the ray
        let miss = distance_ray_line(origin, origin + dir, DVec2::new(-7.0, -1.0), DVec2::new(-7.0, 1.0));
        assert!(miss.is_none());
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(DVec2::ZERO, DVec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(p.x.abs() < 0.001);
        assert!((p.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_angle_ccw_range() {
        let east = DVec2::new(1.0, 0.0);
        let north = DVec2::new(0.0, 1.0);
        let south = DVec2::new(0.0, -1.0);
        assert!((angle_ccw(east, north) - FRAC_PI_2).abs() < 0.001);
        assert!((angle_ccw(north, east) - 3.0 * FRAC_PI_2).abs() < 0.001);
        assert!((angle_ccw(south, north) - PI).abs() < 0.001);
        assert_eq!(angle_ccw(east, east), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square();
        assert!(point_in_polygon(DVec2::new(32.0, 32.0), &poly));
        assert!(!point_in_polygon(DVec2::new(-1.0, 32.0), &poly));
        assert!(!point_in_polygon(DVec2::new(32.0, 65.0), &poly));
    }

    #[test]
    fn test_signed_area_winding() {
        let mut poly = square();
        assert!((polygon_signed_area(&poly) - 4096.0).abs() < 0.001);
        poly.reverse();
        assert!((polygon_signed_area(&poly) + 4096.0).abs() < 0.001);
    }
}
