//! Pens: the shapes swept along paths.
//!
//! A pen is either *elliptical* (an affine image of the unit circle,
//! stored as the transform itself) or *polygonal* (a convex polygon with
//! counter-clockwise vertices). Elliptical pens are rendered by backends as
//! plain strokes of width [`Pen::scale`]; polygonal pens go through the
//! envelope builder.
//!
//! The elliptical transform keeps `MetaPost`'s storage convention: the
//! linear columns are where `(1,0)` and `(0,1)` map, so an untransformed
//! circle of diameter `d` stores the matrix `diag(d, d)` and its scale
//! (`sqrt |det|`) is exactly `d`.

use crate::bbox::BoundingBox;
use crate::path::Path;
use crate::transform::Transform;
use crate::types::{Knot, Point, Scalar, Side, Vec2};

/// `pensquare scaled eps`: the side length of the nearly invisible pen.
const SPECK_SIZE: Scalar = 0.000_49;

/// A pen shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Pen {
    /// Affine image of the unit circle.
    Elliptical(Transform),
    /// Convex polygon, vertices counter-clockwise.
    Polygonal(Vec<Point>),
}

impl Pen {
    /// A circular pen of the given diameter, centred at the origin.
    #[must_use]
    pub const fn circle(diameter: Scalar) -> Self {
        Self::Elliptical(Transform {
            txx: diameter,
            txy: 0.0,
            tx: 0.0,
            tyx: 0.0,
            tyy: diameter,
            ty: 0.0,
        })
    }

    /// The null pen: a single point at the origin.
    #[must_use]
    pub const fn null() -> Self {
        Self::Elliptical(Transform {
            txx: 0.0,
            txy: 0.0,
            tx: 0.0,
            tyx: 0.0,
            tyy: 0.0,
            ty: 0.0,
        })
    }

    /// An axis-aligned square pen of the given side length.
    #[must_use]
    pub fn square(size: Scalar) -> Self {
        let h = size / 2.0;
        Self::Polygonal(vec![
            Point::new(-h, -h),
            Point::new(h, -h),
            Point::new(h, h),
            Point::new(-h, h),
        ])
    }

    /// A razor pen: a horizontal line segment of the given length.
    #[must_use]
    pub fn razor(size: Scalar) -> Self {
        let h = size / 2.0;
        Self::Polygonal(vec![Point::new(-h, 0.0), Point::new(h, 0.0)])
    }

    /// A razor pen rotated by `angle_deg` (calligraphic nib).
    #[must_use]
    pub fn razor_rotated(size: Scalar, angle_deg: Scalar) -> Self {
        let h = size / 2.0;
        let rad = angle_deg * std::f64::consts::PI / 180.0;
        let (sin, cos) = rad.sin_cos();
        Self::Polygonal(vec![
            Point::new(-h * cos, -h * sin),
            Point::new(h * cos, h * sin),
        ])
    }

    /// A nearly invisible square pen, for drawing hairlines.
    #[must_use]
    pub fn speck() -> Self {
        Self::square(SPECK_SIZE)
    }

    /// Build a pen from an arbitrary path by taking the convex hull of its
    /// knot anchors (Bezier controls are ignored).
    ///
    /// A hull of one point degenerates to a zero-size elliptical pen at
    /// that point.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let points: Vec<Point> = path.ring_ids().iter().map(|&id| path[id].point()).collect();
        let hull = convex_hull(&points);
        match hull.as_slice() {
            [] => Self::null(),
            [p] => Self::Elliptical(Transform {
                txx: 0.0,
                txy: 0.0,
                tx: p.x,
                tyx: 0.0,
                tyy: 0.0,
                ty: p.y,
            }),
            _ => Self::Polygonal(hull),
        }
    }

    #[must_use]
    pub const fn is_elliptical(&self) -> bool {
        matches!(self, Self::Elliptical(_))
    }

    /// Polygon vertices, when polygonal.
    #[must_use]
    pub fn polygon(&self) -> Option<&[Point]> {
        match self {
            Self::Elliptical(_) => None,
            Self::Polygonal(v) => Some(v),
        }
    }

    /// The scale of an elliptical pen: `sqrt |det|` of its matrix, which is
    /// the stroke width backends should use. Polygonal pens return 0.
    #[must_use]
    pub fn scale(&self) -> Scalar {
        match self {
            Self::Elliptical(t) => t.determinant().abs().sqrt(),
            Self::Polygonal(_) => 0.0,
        }
    }

    /// Bounding box of the pen outline.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        let mut bb = BoundingBox::EMPTY;
        match self {
            Self::Elliptical(t) => {
                // Extent of the transformed circle around its centre; the
                // matrix stores diameters, so halve for the radius.
                let rx = t.txx.hypot(t.txy) / 2.0;
                let ry = t.tyx.hypot(t.tyy) / 2.0;
                bb.include_point(Point::new(t.tx - rx, t.ty - ry));
                bb.include_point(Point::new(t.tx + rx, t.ty + ry));
            }
            Self::Polygonal(v) => {
                for &p in v {
                    bb.include_point(p);
                }
            }
        }
        bb
    }

    /// The pen under an affine transform.
    ///
    /// Polygonal pens are re-hulled so the counter-clockwise invariant
    /// survives reflections.
    #[must_use]
    pub fn transformed(&self, t: &Transform) -> Self {
        match self {
            Self::Elliptical(pen_t) => Self::Elliptical(pen_t.then(t)),
            Self::Polygonal(v) => {
                let mapped: Vec<Point> = v.iter().map(|&p| t.apply(p)).collect();
                if mapped.len() < 3 {
                    Self::Polygonal(mapped)
                } else {
                    Self::Polygonal(convex_hull(&mapped))
                }
            }
        }
    }

    /// The pen outline as a cyclic path (`makepath`).
    ///
    /// Polygonal pens give a straight-sided cycle; elliptical pens give the
    /// solver-built circle under the pen's transform.
    #[must_use]
    pub fn to_path(&self) -> Path {
        match self {
            Self::Elliptical(t) => crate::predefined::full_circle().transformed(t),
            Self::Polygonal(v) => {
                let mut p = Path::new();
                let n = v.len();
                for (i, &pt) in v.iter().enumerate() {
                    let prev = v[(i + n - 1) % n];
                    let next = v[(i + 1) % n];
                    let left = pt.lerp(prev, 1.0 / 3.0);
                    let right = pt.lerp(next, 1.0 / 3.0);
                    let mut k = Knot::new(pt.x, pt.y);
                    k.left = Side::explicit(left);
                    k.right = Side::explicit(right);
                    p.append(k);
                }
                p
            }
        }
    }

    /// The vertex of a polygonal pen furthest in direction `dir` (the
    /// support point); the boundary point with outward normal `dir` for an
    /// elliptical pen.
    #[must_use]
    pub fn offset_point(&self, dir: Vec2) -> Point {
        match self {
            Self::Elliptical(t) => {
                let det = t.determinant();
                if det.abs() == 0.0 {
                    return Point::new(t.tx, t.ty);
                }
                // T * normalize(T^-T * dir), at half scale since the matrix
                // stores the diameter.
                let ix = (t.tyy * dir.x - t.tyx * dir.y) / det;
                let iy = (-t.txy * dir.x + t.txx * dir.y) / det;
                let len = ix.hypot(iy);
                if len == 0.0 {
                    return Point::new(t.tx, t.ty);
                }
                t.apply(Point::new(ix / len / 2.0, iy / len / 2.0))
            }
            Self::Polygonal(v) => v
                .iter()
                .copied()
                .max_by(|a, b| {
                    let da = dir.x * a.x + dir.y * a.y;
                    let db = dir.x * b.x + dir.y * b.y;
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(Point::ZERO),
        }
    }
}

impl Default for Pen {
    /// The default pen: a circle of diameter 0.5.
    fn default() -> Self {
        Self::circle(0.5)
    }
}

/// Convex hull by Andrew's monotone chain, counter-clockwise.
#[must_use]
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });

    let cross = |o: Point, a: Point, b: Point| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);

    let mut lower: Vec<Point> = Vec::new();
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
