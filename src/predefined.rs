//! Predefined paths: circles built by the spline solver, and the unit
//! square.
//!
//! The circles place knots on the radius-1/2 circle with their tangent
//! directions prescribed (`Given`, tension 1) and run the solver, so their
//! control points are the solver's own, not a kappa approximation.

use crate::math::ANGLE_MULTIPLIER;
use crate::path::hobby::Engine;
use crate::path::Path;
use crate::types::{Knot, Scalar, Side};

/// One knot on the standard circle: anchor at `deg` on the radius-1/2
/// circle, tangent pointing 90 degrees ahead.
fn circle_knot(deg: Scalar) -> Knot {
    let rad = deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let mut k = Knot::new(0.5 * cos, 0.5 * sin);
    let angle = (deg + 90.0) * ANGLE_MULTIPLIER;
    k.left = Side::Given {
        angle,
        tension: 1.0,
    };
    k.right = Side::Given {
        angle,
        tension: 1.0,
    };
    k
}

/// A circle of diameter 1 centred on the origin, starting at (1/2, 0) and
/// running counter-clockwise: 8 knots, 45 degrees apart.
#[must_use]
pub fn full_circle() -> Path {
    let mut p = Path::new();
    for i in 0..8 {
        p.append(circle_knot(45.0 * Scalar::from(i)));
    }
    let mut engine = Engine::new();
    let _ = engine.make_choices(&mut p);
    p
}

/// The upper half of [`full_circle`]: 5 knots from (1/2, 0) to (-1/2, 0).
#[must_use]
pub fn half_circle() -> Path {
    arc_path(5)
}

/// The first quadrant of [`full_circle`]: 3 knots from (1/2, 0) to (0, 1/2).
#[must_use]
pub fn quarter_circle() -> Path {
    arc_path(3)
}

/// An open arc of `count` knots, 45 degrees apart, starting at (1/2, 0).
fn arc_path(count: usize) -> Path {
    let mut p = Path::new();
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let mut k = circle_knot(45.0 * i as Scalar);
        if i == 0 {
            k.left = Side::Endpoint;
        }
        if i == count - 1 {
            k.right = Side::Endpoint;
        }
        p.append(k);
    }
    let mut engine = Engine::new();
    let _ = engine.make_choices(&mut p);
    p
}

/// The unit square `(0,0)--(1,0)--(1,1)--(0,1)--cycle`, straight lines
/// only.
#[must_use]
pub fn unit_square() -> Path {
    let mut p = Path::new();
    for &(x, y) in &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        let mut k = Knot::new(x, y);
        k.left = Side::Explicit { x, y };
        k.right = Side::Explicit { x, y };
        p.append(k);
    }
    p
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
