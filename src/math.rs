//! Scalar primitives with `MetaPost`'s fixed-point scaling, on doubles.
//!
//! `MetaPost`'s double backend keeps the numerical scaling of the original
//! fixed-point arithmetic so that every algorithmic threshold stays
//! meaningful: *fractions* are plain numbers multiplied by 4096, *angles*
//! are degrees multiplied by 16. The functions here reproduce that backend
//! operation for operation.
//!
//! Determinism matters: [`take_fraction`], [`velocity`], [`crossing_point`]
//! and friends are written with the exact parenthesisation of the reference
//! backend and must not be "simplified", fused or reassociated. The
//! iterative bisection in `crossing_point` terminates on bit counts of its
//! tolerance, so a one-ULP drift can change which pen corner wins during
//! envelope construction.

use crate::types::Scalar;

/// The scaled representation of 1.0.
pub const UNITY: Scalar = 1.0;

/// Machine epsilon of the double backend, 2^-52.
pub const EPSILON: Scalar = 2.220_446_049_250_313e-16;

/// Fractions are scaled by this factor.
pub const FRACTION_MULTIPLIER: Scalar = 4096.0;

/// Angles are degrees scaled by this factor.
pub const ANGLE_MULTIPLIER: Scalar = 16.0;

pub const FRACTION_HALF: Scalar = 0.5 * FRACTION_MULTIPLIER;
pub const FRACTION_ONE: Scalar = FRACTION_MULTIPLIER;
pub const FRACTION_TWO: Scalar = 2.0 * FRACTION_MULTIPLIER;
pub const FRACTION_THREE: Scalar = 3.0 * FRACTION_MULTIPLIER;
pub const FRACTION_FOUR: Scalar = 4.0 * FRACTION_MULTIPLIER;

/// Largest representable value; stands in for "infinity" in tensions and
/// curls the way the double backend caps them.
pub const INFINITY: Scalar = f64::MAX / 2.0 - 1.0;

/// Starting tolerance for the adaptive arc-length bisection.
pub const ARC_TOLERANCE: Scalar = UNITY / 4096.0;

/// Angles closer than this (in scaled degrees) are treated as parallel when
/// intersecting miter offset lines.
pub(crate) const NEAR_ZERO_ANGLE: Scalar = 0.0256 * ANGLE_MULTIPLIER;

/// The fixed-point constant 1365/65536 used by the curl-ratio denominator.
pub(crate) const TWELVE_BITS_3: Scalar = 1365.0 / 65536.0;

/// `(a / b) * 4096`: build a fraction from a quotient.
#[inline]
#[must_use]
pub fn make_fraction(a: Scalar, b: Scalar) -> Scalar {
    (a / b) * FRACTION_MULTIPLIER
}

/// `(a * b) / 4096`: multiply by a fraction.
#[inline]
#[must_use]
pub fn take_fraction(a: Scalar, b: Scalar) -> Scalar {
    (a * b) / FRACTION_MULTIPLIER
}

/// Interpolate: `b - take_fraction(b - c, t)` with `t` in fraction units.
#[inline]
#[must_use]
pub fn of_the_way(b: Scalar, c: Scalar, t: Scalar) -> Scalar {
    b - take_fraction(b - c, t)
}

/// Angle of the vector `(x, y)` in scaled degrees.
#[inline]
#[must_use]
pub fn n_arg(x: Scalar, y: Scalar) -> Scalar {
    y.atan2(x) * (180.0 / std::f64::consts::PI) * ANGLE_MULTIPLIER
}

/// Cosine and sine of a scaled-degree angle, scaled by
/// [`FRACTION_MULTIPLIER`].
///
/// The quadrant boundaries at ±90° and 180° are special-cased so the zero
/// component comes out exactly zero instead of a subnormal residue.
#[must_use]
pub fn sin_cos(z: Scalar) -> (Scalar, Scalar) {
    let degrees = z / ANGLE_MULTIPLIER;
    if degrees == 90.0 || degrees == -270.0 {
        return (0.0, FRACTION_MULTIPLIER);
    }
    if degrees == -90.0 || degrees == 270.0 {
        return (0.0, -FRACTION_MULTIPLIER);
    }
    if degrees == 180.0 || degrees == -180.0 {
        return (-FRACTION_MULTIPLIER, 0.0);
    }
    let rad = degrees * std::f64::consts::PI / 180.0;
    (rad.cos() * FRACTION_MULTIPLIER, rad.sin() * FRACTION_MULTIPLIER)
}

/// Fold a scaled-degree angle into `(-180°, 180°]`.
#[must_use]
pub fn reduce_angle(a: Scalar) -> Scalar {
    let one_eighty = 180.0 * ANGLE_MULTIPLIER;
    let three_sixty = 360.0 * ANGLE_MULTIPLIER;
    if a > one_eighty {
        a - three_sixty
    } else if a < -one_eighty {
        a + three_sixty
    } else {
        a
    }
}

/// Pythagorean addition `sqrt(a^2 + b^2)` without overflow.
#[inline]
#[must_use]
pub fn pyth_add(a: Scalar, b: Scalar) -> Scalar {
    a.hypot(b)
}

/// Pythagorean subtraction `sqrt(a^2 - b^2)`, clamped to zero.
#[inline]
#[must_use]
pub fn pyth_sub(a: Scalar, b: Scalar) -> Scalar {
    let v = a * a - b * b;
    if v <= 0.0 {
        0.0
    } else {
        v.sqrt()
    }
}

/// Negate, normalising `-0.0` to `0.0`.
#[inline]
#[must_use]
pub(crate) fn negate(x: Scalar) -> Scalar {
    if x == 0.0 {
        0.0
    } else {
        -x
    }
}

/// Sign of `a*b - c*d`: `1.0`, `0.0` or `-1.0`.
///
/// Callers inspect the sign only; never subtract the products yourself.
#[must_use]
pub fn ab_vs_cd(a: Scalar, b: Scalar, c: Scalar, d: Scalar) -> Scalar {
    let ab = a * b;
    let cd = c * d;
    if ab > cd {
        1.0
    } else if ab < cd {
        -1.0
    } else {
        0.0
    }
}

/// First sign change of the quadratic `a(1-t)^2 + 2b(1-t)t + c t^2` on
/// `[0, 1]`, in fraction units.
///
/// Returns `0.0` when the quadratic starts non-positive, [`FRACTION_ONE`]
/// for a crossing exactly at `t = 1`, and a value greater than
/// [`FRACTION_ONE`] when there is no crossing. The bisection accumulates
/// the answer one bit at a time; the `1e-12` nudge keeps the midpoint off
/// exact ties.
#[must_use]
pub fn crossing_point(a: Scalar, b: Scalar, c: Scalar) -> Scalar {
    let no_crossing = FRACTION_ONE + 1.0;
    if a < 0.0 {
        return 0.0;
    }
    if c >= 0.0 {
        if b >= 0.0 {
            if c > 0.0 {
                return no_crossing;
            }
            if a == 0.0 && b == 0.0 {
                return no_crossing;
            }
            return FRACTION_ONE;
        }
        if a == 0.0 {
            return 0.0;
        }
    } else if a == 0.0 && b <= 0.0 {
        return 0.0;
    }

    let mut d = EPSILON;
    let mut x0 = a;
    let mut x1 = a - b;
    let mut x2 = b - c;
    loop {
        let x = (x1 + x2) / 2.0 + 1e-12;
        if x1 - x0 > x0 {
            x2 = x;
            x0 += x0;
            d += d;
        } else {
            let xx = x1 + x - x0;
            if xx > x0 {
                x2 = x;
                x0 += x0;
                d += d;
            } else {
                x0 -= xx;
                if x <= x0 && x + x2 <= x0 {
                    return no_crossing;
                }
                x1 = x;
                d = d + d + EPSILON;
            }
        }
        if d >= FRACTION_ONE {
            break;
        }
    }
    d - FRACTION_ONE
}

/// Hobby's velocity function.
///
/// Inputs are sines and cosines in fraction units and a tension; the result
/// is the fraction of the chord used as the control-handle length, capped
/// at [`FRACTION_FOUR`].
#[must_use]
pub fn velocity(st: Scalar, ct: Scalar, sf: Scalar, cf: Scalar, t: Scalar) -> Scalar {
    let sqrt5 = 5.0_f64.sqrt();
    let mut acc = take_fraction(st - sf / 16.0, sf - st / 16.0);
    acc = take_fraction(acc, ct - cf);
    let mut num = FRACTION_TWO + take_fraction(acc, std::f64::consts::SQRT_2 * FRACTION_ONE);
    let denom = FRACTION_THREE
        + take_fraction(ct, 3.0 * FRACTION_HALF * (sqrt5 - 1.0))
        + take_fraction(cf, 3.0 * FRACTION_HALF * (3.0 - sqrt5));
    if t != UNITY {
        num /= t;
    }
    if num / 4.0 >= denom {
        FRACTION_FOUR
    } else {
        make_fraction(num, denom)
    }
}

/// Boundary coefficient for a curl condition.
///
/// `gamma` is the curl, `a_tension` the tension on the curl side and
/// `b_tension` the tension on the far side. The result is capped at
/// [`FRACTION_FOUR`].
#[must_use]
pub fn curl_ratio(gamma: Scalar, a_tension: Scalar, b_tension: Scalar) -> Scalar {
    let alpha = make_fraction(UNITY, a_tension);
    let mut beta = make_fraction(UNITY, b_tension);
    let mut g = gamma;
    let mut denom;
    if alpha <= beta {
        let mut ff = make_fraction(alpha, beta);
        ff = take_fraction(ff, ff);
        g = take_fraction(g, ff);
        beta /= FRACTION_MULTIPLIER;
        denom = take_fraction(g, alpha) + 3.0;
    } else {
        let mut ff = make_fraction(beta, alpha);
        ff = take_fraction(ff, ff);
        beta = take_fraction(beta, ff) / FRACTION_MULTIPLIER;
        denom = take_fraction(g, alpha) + ff / TWELVE_BITS_3;
    }
    denom -= beta;
    let num = take_fraction(g, 3.0 - alpha) + beta;
    if num >= 4.0 * denom {
        FRACTION_FOUR
    } else {
        make_fraction(num, denom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ab_vs_cd_signs() {
        assert_eq!(ab_vs_cd(2.0, 3.0, 1.0, 5.0), 1.0);
        assert_eq!(ab_vs_cd(1.0, 2.0, 2.0, 1.0), 0.0);
        assert_eq!(ab_vs_cd(1.0, 1.0, 2.0, 2.0), -1.0);
    }

    #[test]
    fn crossing_point_boundaries() {
        // Negative start: crossing at t = 0.
        assert_eq!(crossing_point(-1.0, 0.0, 0.0), 0.0);
        // Everywhere positive: no crossing.
        assert_eq!(crossing_point(1.0, 1.0, 1.0), FRACTION_ONE + 1.0);
        // Touches zero exactly at t = 1.
        assert_eq!(crossing_point(1.0, 1.0, 0.0), FRACTION_ONE);
        // Identically zero quadratic: no crossing.
        assert_eq!(crossing_point(0.0, 0.0, 1.0), FRACTION_ONE + 1.0);
    }

    #[test]
    fn crossing_point_midway() {
        // a = 1, b = 0, c = -1 crosses at t = 0.5.
        let t = crossing_point(1.0, 0.0, -1.0);
        assert!(
            (t / FRACTION_ONE - 0.5).abs() < 1e-6,
            "expected crossing near 0.5, got {}",
            t / FRACTION_ONE
        );
    }

    #[test]
    fn sin_cos_quadrants() {
        let (c, s) = sin_cos(90.0 * ANGLE_MULTIPLIER);
        assert_eq!(c, 0.0);
        assert_eq!(s, FRACTION_MULTIPLIER);

        let (c, s) = sin_cos(180.0 * ANGLE_MULTIPLIER);
        assert_eq!(c, -FRACTION_MULTIPLIER);
        assert_eq!(s, 0.0);

        let (c, s) = sin_cos(-90.0 * ANGLE_MULTIPLIER);
        assert_eq!(c, 0.0);
        assert_eq!(s, -FRACTION_MULTIPLIER);

        let (c, s) = sin_cos(45.0 * ANGLE_MULTIPLIER);
        assert!((c - s).abs() < 1e-9);
    }

    #[test]
    fn n_arg_axes() {
        assert!((n_arg(1.0, 0.0)).abs() < 1e-9);
        assert!((n_arg(0.0, 1.0) - 90.0 * ANGLE_MULTIPLIER).abs() < 1e-9);
        assert!((n_arg(-1.0, 0.0) - 180.0 * ANGLE_MULTIPLIER).abs() < 1e-9);
        assert!((n_arg(1.0, 1.0) - 45.0 * ANGLE_MULTIPLIER).abs() < 1e-9);
    }

    #[test]
    fn reduce_angle_folds() {
        let one_eighty = 180.0 * ANGLE_MULTIPLIER;
        assert_eq!(reduce_angle(one_eighty + 16.0), 16.0 - 2.0 * one_eighty);
        assert_eq!(reduce_angle(-one_eighty - 16.0), 2.0 * one_eighty - 16.0);
        assert_eq!(reduce_angle(16.0), 16.0);
    }

    #[test]
    fn velocity_straight_line() {
        // theta = phi = 0 at tension 1: the classical 1/3 handle.
        let v = velocity(0.0, FRACTION_ONE, 0.0, FRACTION_ONE, UNITY);
        assert!(
            (v / FRACTION_ONE - 1.0 / 3.0).abs() < 1e-6,
            "velocity for straight line: {}",
            v / FRACTION_ONE
        );
    }

    #[test]
    fn velocity_higher_tension_shortens() {
        let v1 = velocity(0.0, FRACTION_ONE, 0.0, FRACTION_ONE, UNITY);
        let v2 = velocity(0.0, FRACTION_ONE, 0.0, FRACTION_ONE, 2.0);
        assert!(v2 < v1);
    }

    #[test]
    fn pyth_sub_clamps() {
        assert!((pyth_sub(5.0, 3.0) - 4.0).abs() < 1e-12);
        assert_eq!(pyth_sub(3.0, 5.0), 0.0);
    }

    #[test]
    fn of_the_way_endpoints() {
        assert_eq!(of_the_way(2.0, 6.0, 0.0), 2.0);
        assert_eq!(of_the_way(2.0, 6.0, FRACTION_ONE), 6.0);
        assert_eq!(of_the_way(2.0, 6.0, FRACTION_HALF), 4.0);
    }

    #[test]
    fn negate_zero() {
        assert_eq!(negate(0.0), 0.0);
        assert!(negate(0.0).is_sign_positive());
    }
}
