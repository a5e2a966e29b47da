//! Cubic Bezier segment operations.
//!
//! [`CubicSegment`] is the shared view of one path segment: De Casteljau
//! evaluation, splitting, derivatives and control-hull bounds. The expanded
//! polynomial form is never used for point evaluation.

use crate::path::{KnotId, Path};
use crate::types::{Point, Scalar, Vec2};

/// Four control points of a cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicSegment {
    #[must_use]
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// The segment leaving knot `p` on `path`.
    ///
    /// Non-explicit sides fall back to the anchor, so unsolved straight
    /// segments read as degenerate lines.
    #[must_use]
    pub fn from_ring(path: &Path, p: KnotId) -> Self {
        let q = path.next(p);
        let kp = &path[p];
        let kq = &path[q];
        let (rx, ry) = kp.right_control();
        let (lx, ly) = kq.left_control();
        Self {
            p0: kp.point(),
            p1: Point::new(rx, ry),
            p2: Point::new(lx, ly),
            p3: kq.point(),
        }
    }

    /// Point at parameter `t` in [0, 1], by De Casteljau.
    #[must_use]
    pub fn eval(&self, t: Scalar) -> Point {
        let u = 1.0 - t;
        let q0x = u * self.p0.x + t * self.p1.x;
        let q0y = u * self.p0.y + t * self.p1.y;
        let q1x = u * self.p1.x + t * self.p2.x;
        let q1y = u * self.p1.y + t * self.p2.y;
        let q2x = u * self.p2.x + t * self.p3.x;
        let q2y = u * self.p2.y + t * self.p3.y;

        let r0x = u * q0x + t * q1x;
        let r0y = u * q0y + t * q1y;
        let r1x = u * q1x + t * q2x;
        let r1y = u * q1y + t * q2y;

        Point::new(u * r0x + t * r1x, u * r0y + t * r1y)
    }

    /// Tangent vector at parameter `t` (not normalised).
    #[must_use]
    pub fn eval_deriv(&self, t: Scalar) -> Vec2 {
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;
        let ut2 = 2.0 * u * t;

        let ax = self.p1.x - self.p0.x;
        let ay = self.p1.y - self.p0.y;
        let bx = self.p2.x - self.p1.x;
        let by = self.p2.y - self.p1.y;
        let cx = self.p3.x - self.p2.x;
        let cy = self.p3.y - self.p2.y;

        Vec2::new(
            3.0 * (u2 * ax + ut2 * bx + t2 * cx),
            3.0 * (u2 * ay + ut2 * by + t2 * cy),
        )
    }

    /// Split at parameter `t`, returning `(left, right)`.
    #[must_use]
    pub fn split(&self, t: Scalar) -> (Self, Self) {
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let abcd = abc.lerp(bcd, t);
        (
            Self::new(self.p0, ab, abc, abcd),
            Self::new(abcd, bcd, cd, self.p3),
        )
    }

    /// Axis-aligned bounds of the control hull: `(min, max)`.
    #[must_use]
    pub fn hull_bbox(&self) -> (Point, Point) {
        let min_x = self.p0.x.min(self.p1.x).min(self.p2.x).min(self.p3.x);
        let min_y = self.p0.y.min(self.p1.y).min(self.p2.y).min(self.p3.y);
        let max_x = self.p0.x.max(self.p1.x).max(self.p2.x).max(self.p3.x);
        let max_y = self.p0.y.max(self.p1.y).max(self.p2.y).max(self.p3.y);
        (Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Larger side of the control-hull bounds.
    #[must_use]
    pub fn hull_size(&self) -> Scalar {
        let (min, max) = self.hull_bbox();
        (max.x - min.x).max(max.y - min.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
