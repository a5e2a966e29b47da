//! Affine transforms over curve types.
//!
//! The transform primitives mirror `MetaPost`'s: `shifted`, `rotated`,
//! `scaled`, `xscaled`, `yscaled`, `slanted`, `zscaled`, plus composition
//! and inversion. A transform is six named floats applied as
//!
//! ```text
//! x' = txx*x + txy*y + tx
//! y' = tyx*x + tyy*y + ty
//! ```

use crate::math;
use crate::path::Path;
use crate::types::{Point, Scalar, Side, Vec2};

/// A 2x3 affine transform with named components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub txx: Scalar,
    pub txy: Scalar,
    pub tx: Scalar,
    pub tyx: Scalar,
    pub tyy: Scalar,
    pub ty: Scalar,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        txx: 1.0,
        txy: 0.0,
        tx: 0.0,
        tyx: 0.0,
        tyy: 1.0,
        ty: 0.0,
    };

    /// Translation by `(dx, dy)`.
    #[must_use]
    pub const fn shifted(dx: Scalar, dy: Scalar) -> Self {
        Self {
            txx: 1.0,
            txy: 0.0,
            tx: dx,
            tyx: 0.0,
            tyy: 1.0,
            ty: dy,
        }
    }

    /// Uniform scale about the origin.
    #[must_use]
    pub const fn scaled(s: Scalar) -> Self {
        Self {
            txx: s,
            txy: 0.0,
            tx: 0.0,
            tyx: 0.0,
            tyy: s,
            ty: 0.0,
        }
    }

    /// Horizontal scale only.
    #[must_use]
    pub const fn xscaled(s: Scalar) -> Self {
        Self {
            txx: s,
            ..Self::IDENTITY
        }
    }

    /// Vertical scale only.
    #[must_use]
    pub const fn yscaled(s: Scalar) -> Self {
        Self {
            tyy: s,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin by degrees, counter-clockwise.
    #[must_use]
    pub fn rotated(angle_deg: Scalar) -> Self {
        let rad = angle_deg * std::f64::consts::PI / 180.0;
        let (sin, cos) = rad.sin_cos();
        Self {
            txx: cos,
            txy: -sin,
            tx: 0.0,
            tyx: sin,
            tyy: cos,
            ty: 0.0,
        }
    }

    /// Horizontal shear: `x' = x + s*y`.
    #[must_use]
    pub const fn slanted(s: Scalar) -> Self {
        Self {
            txy: s,
            ..Self::IDENTITY
        }
    }

    /// Complex multiplication by `(a, b)`: scale by `hypot(a, b)` and rotate
    /// by `atan2(b, a)`.
    #[must_use]
    pub const fn zscaled(a: Scalar, b: Scalar) -> Self {
        Self {
            txx: a,
            txy: -b,
            tx: 0.0,
            tyx: b,
            tyy: a,
            ty: 0.0,
        }
    }

    /// Rotation about an arbitrary point.
    #[must_use]
    pub fn rotated_around(cx: Scalar, cy: Scalar, angle_deg: Scalar) -> Self {
        Self::shifted(-cx, -cy)
            .then(&Self::rotated(angle_deg))
            .then(&Self::shifted(cx, cy))
    }

    /// Uniform scale about an arbitrary point.
    #[must_use]
    pub fn scaled_around(cx: Scalar, cy: Scalar, s: Scalar) -> Self {
        Self::shifted(-cx, -cy)
            .then(&Self::scaled(s))
            .then(&Self::shifted(cx, cy))
    }

    /// Reflection about the line through `(x1, y1)` and `(x2, y2)`.
    ///
    /// Degenerate (coincident points) yields the identity.
    #[must_use]
    pub fn reflected_about(x1: Scalar, y1: Scalar, x2: Scalar, y2: Scalar) -> Self {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let d2 = dx * dx + dy * dy;
        if d2 == 0.0 {
            return Self::IDENTITY;
        }
        let cos2 = (dx * dx - dy * dy) / d2;
        let sin2 = 2.0 * dx * dy / d2;
        let reflect = Self {
            txx: cos2,
            txy: sin2,
            tx: 0.0,
            tyx: sin2,
            tyy: -cos2,
            ty: 0.0,
        };
        Self::shifted(-x1, -y1)
            .then(&reflect)
            .then(&Self::shifted(x1, y1))
    }

    /// Compose: `self` applied first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            txx: other.txx * self.txx + other.txy * self.tyx,
            txy: other.txx * self.txy + other.txy * self.tyy,
            tx: other.txx * self.tx + other.txy * self.ty + other.tx,
            tyx: other.tyx * self.txx + other.tyy * self.tyx,
            tyy: other.tyx * self.txy + other.tyy * self.tyy,
            ty: other.tyx * self.tx + other.tyy * self.ty + other.ty,
        }
    }

    /// Apply to a point.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.txx * p.x + self.txy * p.y + self.tx,
            self.tyx * p.x + self.tyy * p.y + self.ty,
        )
    }

    /// Apply the linear part to a direction (translation ignored).
    #[must_use]
    pub fn apply_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.txx * v.x + self.txy * v.y,
            self.tyx * v.x + self.tyy * v.y,
        )
    }

    /// Determinant of the linear part (the area scale factor).
    #[must_use]
    pub fn determinant(&self) -> Scalar {
        self.txx * self.tyy - self.txy * self.tyx
    }

    /// The inverse transform, or `None` when singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            txx: self.tyy * inv,
            txy: -self.txy * inv,
            tx: (self.txy * self.ty - self.tyy * self.tx) * inv,
            tyx: -self.tyx * inv,
            tyy: self.txx * inv,
            ty: (self.tyx * self.tx - self.txx * self.ty) * inv,
        })
    }

    /// Transform one boundary side in place.
    ///
    /// Explicit controls are mapped as points; a `Given` direction is mapped
    /// through the linear part and its scaled-degree angle recomputed. Curl
    /// and tension values are unaffected by affine maps.
    pub(crate) fn apply_side(&self, side: &mut Side) {
        match *side {
            Side::Explicit { x, y } => {
                let p = self.apply(Point::new(x, y));
                *side = Side::Explicit { x: p.x, y: p.y };
            }
            Side::Given { angle, tension } => {
                let rad = angle / math::ANGLE_MULTIPLIER * std::f64::consts::PI / 180.0;
                let v = self.apply_vec(Vec2::new(rad.cos(), rad.sin()));
                if v.hypot() > 0.0 {
                    *side = Side::Given {
                        angle: math::n_arg(v.x, v.y),
                        tension,
                    };
                }
            }
            Side::Endpoint | Side::Curl { .. } | Side::Open { .. } | Side::EndCycle { .. } => {}
        }
    }
}

impl Path {
    /// A transformed copy of this path.
    #[must_use]
    pub fn transformed(&self, t: &Transform) -> Self {
        let mut out = self.copy();
        out.apply_transform(t);
        out
    }

    /// Apply a transform to every knot in place.
    pub fn apply_transform(&mut self, t: &Transform) {
        for id in self.ring_ids() {
            let k = &mut self[id];
            let p = t.apply(Point::new(k.x, k.y));
            k.x = p.x;
            k.y = p.y;
            t.apply_side(&mut k.left);
            t.apply_side(&mut k.right);
        }
        if let Some(env) = self.envelope.as_mut() {
            env.apply_transform(t);
        }
    }

    /// `self shifted (dx, dy)`.
    #[must_use]
    pub fn shifted(&self, dx: Scalar, dy: Scalar) -> Self {
        self.transformed(&Transform::shifted(dx, dy))
    }

    /// `self scaled s`.
    #[must_use]
    pub fn scaled(&self, s: Scalar) -> Self {
        self.transformed(&Transform::scaled(s))
    }

    /// `self rotated angle` (degrees, counter-clockwise).
    #[must_use]
    pub fn rotated(&self, angle_deg: Scalar) -> Self {
        self.transformed(&Transform::rotated(angle_deg))
    }

    /// `self slanted s`.
    #[must_use]
    pub fn slanted(&self, s: Scalar) -> Self {
        self.transformed(&Transform::slanted(s))
    }

    /// `self xscaled s`.
    #[must_use]
    pub fn xscaled(&self, s: Scalar) -> Self {
        self.transformed(&Transform::xscaled(s))
    }

    /// `self yscaled s`.
    #[must_use]
    pub fn yscaled(&self, s: Scalar) -> Self {
        self.transformed(&Transform::yscaled(s))
    }

    /// `self zscaled (a, b)`.
    #[must_use]
    pub fn zscaled(&self, a: Scalar, b: Scalar) -> Self {
        self.transformed(&Transform::zscaled(a, b))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Scalar = 1e-9;

    #[test]
    fn identity_composition() {
        let t = Transform {
            txx: 3.0,
            txy: 4.0,
            tx: 1.0,
            tyx: 5.0,
            tyy: 6.0,
            ty: 2.0,
        };
        assert_eq!(t.then(&Transform::IDENTITY), t);
        assert_eq!(Transform::IDENTITY.then(&t), t);
    }

    #[test]
    fn compose_matches_sequential_application() {
        // (A.then(B)).apply(p) == B.apply(A.apply(p))
        let a = Transform::rotated(30.0).then(&Transform::shifted(2.0, -1.0));
        let b = Transform::scaled(1.5).then(&Transform::slanted(0.25));
        let p = Point::new(3.0, 4.0);
        let lhs = a.then(&b).apply(p);
        let rhs = b.apply(a.apply(p));
        assert!((lhs.x - rhs.x).abs() < TOL && (lhs.y - rhs.y).abs() < TOL);
    }

    #[test]
    fn rotation_quarter_turn() {
        let t = Transform::rotated(90.0);
        let p = t.apply(Point::new(1.0, 0.0));
        assert!(p.x.abs() < TOL && (p.y - 1.0).abs() < TOL);
    }

    #[test]
    fn inverse_round_trip() {
        let t = Transform::rotated(37.0)
            .then(&Transform::scaled(2.5))
            .then(&Transform::shifted(7.0, -3.0));
        let inv = t.inverse().expect("invertible");
        let p = Point::new(1.25, -8.5);
        let q = inv.apply(t.apply(p));
        assert!((q.x - p.x).abs() < TOL && (q.y - p.y).abs() < TOL);
    }

    #[test]
    fn inverse_singular_is_none() {
        let t = Transform::scaled(0.0);
        assert!(t.inverse().is_none());
    }

    #[test]
    fn zscaled_is_rotate_and_scale() {
        // zscaled (0, 1) rotates by 90 degrees.
        let t = Transform::zscaled(0.0, 1.0);
        let p = t.apply(Point::new(2.0, 0.0));
        assert!(p.x.abs() < TOL && (p.y - 2.0).abs() < TOL);
    }

    #[test]
    fn reflection_about_x_axis() {
        let t = Transform::reflected_about(0.0, 0.0, 1.0, 0.0);
        let p = t.apply(Point::new(3.0, 4.0));
        assert!((p.x - 3.0).abs() < TOL && (p.y + 4.0).abs() < TOL);
    }

    #[test]
    fn reflection_degenerate_is_identity() {
        let t = Transform::reflected_about(1.0, 1.0, 1.0, 1.0);
        assert_eq!(t, Transform::IDENTITY);
    }

    #[test]
    fn determinant_of_scale() {
        assert!((Transform::scaled(3.0).determinant() - 9.0).abs() < TOL);
        assert!((Transform::rotated(123.0).determinant() - 1.0).abs() < TOL);
    }

    #[test]
    fn given_side_rotates() {
        let mut side = Side::Given {
            angle: 0.0,
            tension: 1.0,
        };
        Transform::rotated(90.0).apply_side(&mut side);
        match side {
            Side::Given { angle, .. } => {
                assert!((angle - 90.0 * math::ANGLE_MULTIPLIER).abs() < 1e-6);
            }
            other => panic!("expected Given, got {other:?}"),
        }
    }
}
