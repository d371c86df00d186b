//! Inclined plane `a*x + b*y + c*z = d`.

use serde::{Deserialize, Serialize};

/// A plane in the form `a*x + b*y + c*z = d`, used for floor and ceiling
/// surfaces. Flat planes have `a = b = 0, c = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Plane {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// A horizontal plane at `height`
    pub fn flat(height: f64) -> Self {
        Self::new(0.0, 0.0, 1.0, height)
    }

    /// Height of the plane at `(x, y)`. A vertical plane (`c == 0`) has no
    /// defined height; `d` is returned.
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        if self.c == 0.0 {
            return self.d;
        }
        (self.d - self.a * x - self.b * y) / self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_height() {
        let plane = Plane::flat(64.0);
        assert!((plane.height_at(1000.0, -300.0) - 64.0).abs() < 0.001);
    }

    #[test]
    fn test_sloped_height() {
        // z = 0.5x
        let plane = Plane::new(-0.5, 0.0, 1.0, 0.0);
        assert!((plane.height_at(10.0, 0.0) - 5.0).abs() < 0.001);
        assert!((plane.height_at(-4.0, 99.0) + 2.0).abs() < 0.001);
    }
}
