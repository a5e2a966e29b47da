//! Axis-aligned bounding boxes.

use crate::bezier::CubicSegment;
use crate::path::Path;
use crate::types::{Point, Scalar};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: Scalar,
    pub min_y: Scalar,
    pub max_x: Scalar,
    pub max_y: Scalar,
}

impl BoundingBox {
    /// An empty (inverted) bounding box.
    pub const EMPTY: Self = Self {
        min_x: Scalar::INFINITY,
        min_y: Scalar::INFINITY,
        max_x: Scalar::NEG_INFINITY,
        max_y: Scalar::NEG_INFINITY,
    };

    /// True once at least one point has been included.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    #[must_use]
    pub fn width(&self) -> Scalar {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn height(&self) -> Scalar {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn llcorner(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Lower-right corner.
    #[must_use]
    pub const fn lrcorner(&self) -> Point {
        Point::new(self.max_x, self.min_y)
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn ulcorner(&self) -> Point {
        Point::new(self.min_x, self.max_y)
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn urcorner(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    /// Grow to include a point.
    pub fn include_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Grow to include another box.
    pub fn union(&mut self, other: &Self) {
        if other.is_valid() {
            self.min_x = self.min_x.min(other.min_x);
            self.min_y = self.min_y.min(other.min_y);
            self.max_x = self.max_x.max(other.max_x);
            self.max_y = self.max_y.max(other.max_y);
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Path {
    /// Tight bounding box of the path's curve.
    ///
    /// Each segment contributes its endpoints and the interior extrema of
    /// its coordinate polynomials (roots of the derivative quadratics), so
    /// the box hugs the curve rather than the control hull.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        let mut bb = BoundingBox::EMPTY;
        let Some(head) = self.head() else {
            return bb;
        };
        let n = self.path_length();
        if n == 0 {
            bb.include_point(self[head].point());
            return bb;
        }
        for seg in 0..n {
            let Some(k) = self.segment_start(seg) else {
                break;
            };
            let cubic = CubicSegment::from_ring(self, k);
            bb.include_point(cubic.p0);
            bb.include_point(cubic.p3);
            for t in coordinate_extrema(cubic.p0.x, cubic.p1.x, cubic.p2.x, cubic.p3.x) {
                bb.include_point(cubic.eval(t));
            }
            for t in coordinate_extrema(cubic.p0.y, cubic.p1.y, cubic.p2.y, cubic.p3.y) {
                bb.include_point(cubic.eval(t));
            }
        }
        bb
    }
}

/// Interior parameters where one coordinate of a cubic is extremal: roots
/// of the derivative quadratic `(A-2B+C)t^2 + 2(B-A)t + A` with
/// `A = p1-p0`, `B = p2-p1`, `C = p3-p2`.
fn coordinate_extrema(p0: Scalar, p1: Scalar, p2: Scalar, p3: Scalar) -> Vec<Scalar> {
    let a = (p1 - p0) - 2.0 * (p2 - p1) + (p3 - p2);
    let b = 2.0 * ((p2 - p1) - (p1 - p0));
    let c = p1 - p0;

    let mut out = Vec::new();
    let mut push = |t: Scalar| {
        if t > 0.0 && t < 1.0 {
            out.push(t);
        }
    };

    if a == 0.0 {
        if b != 0.0 {
            push(-c / b);
        }
        return out;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return out;
    }
    let sd = disc.sqrt();
    push((-b + sd) / (2.0 * a));
    push((-b - sd) / (2.0 * a));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Knot, Side};

    #[test]
    fn empty_box_invalid() {
        let bb = BoundingBox::EMPTY;
        assert!(!bb.is_valid());
        assert_eq!(bb.width(), 0.0);
    }

    #[test]
    fn include_and_union() {
        let mut a = BoundingBox::EMPTY;
        a.include_point(Point::new(1.0, 2.0));
        a.include_point(Point::new(-1.0, 5.0));
        assert!(a.is_valid());
        assert_eq!(a.llcorner(), Point::new(-1.0, 2.0));
        assert_eq!(a.urcorner(), Point::new(1.0, 5.0));

        let mut b = BoundingBox::EMPTY;
        b.include_point(Point::new(10.0, 0.0));
        a.union(&b);
        assert_eq!(a.lrcorner(), Point::new(10.0, 0.0));
        assert_eq!(a.ulcorner(), Point::new(-1.0, 5.0));
    }

    #[test]
    fn path_bbox_hugs_the_curve() {
        // An arch whose control points overshoot the curve: the tight box
        // must stop at the curve's apex, below the hull top.
        let mut p = Path::new();
        let mut k0 = Knot::new(0.0, 0.0);
        k0.left = Side::Endpoint;
        k0.right = Side::Explicit { x: 0.0, y: 40.0 };
        p.append(k0);
        let mut k1 = Knot::new(30.0, 0.0);
        k1.left = Side::Explicit { x: 30.0, y: 40.0 };
        k1.right = Side::Endpoint;
        p.append(k1);

        let bb = p.bbox();
        assert!((bb.min_x - 0.0).abs() < 1e-9);
        assert!((bb.max_x - 30.0).abs() < 1e-9);
        assert!((bb.min_y - 0.0).abs() < 1e-9);
        // Apex of this symmetric cubic is at 3/4 of the control height.
        assert!((bb.max_y - 30.0).abs() < 1e-9, "max_y = {}", bb.max_y);
    }

    #[test]
    fn single_knot_bbox() {
        let mut p = Path::new();
        p.append(Knot::new(3.0, 4.0));
        let bb = p.bbox();
        assert!(bb.is_valid());
        assert_eq!(bb.llcorner(), Point::new(3.0, 4.0));
        assert_eq!(bb.width(), 0.0);
    }
}
