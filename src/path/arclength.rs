//! Arc length and arc time by adaptive bisection.
//!
//! A segment's speed is a quadratic in `t` whose controls are the three
//! derivative differences of the cubic. [`Path::arc_length`] integrates it
//! with a Simpson-weighted estimate, bisecting until the controls are
//! confined to one quadrant (possibly after a 45-degree rotation) and the
//! estimate is within tolerance. Each level of bisection halves the segment
//! but not the control differences, so results are halved on the way up and
//! the tolerance grows by 1.5 per level.
//!
//! [`Path::arc_time`] is the inverse: it walks segments consuming arc
//! length; inside a segment the recursion reports a goal hit at local time
//! `t` through the negative sentinel `-(2 - t)`.

use crate::math::ARC_TOLERANCE;
use crate::path::{KnotId, Path};
use crate::types::Scalar;

impl Path {
    /// Total arc length of the path.
    #[must_use]
    pub fn arc_length(&self) -> Scalar {
        if self.head().is_none() {
            return 0.0;
        }
        let n = self.path_length();
        let mut total = 0.0;
        for seg in 0..n {
            let Some(k) = self.segment_start(seg) else {
                break;
            };
            let (dx0, dy0, dx1, dy1, dx2, dy2) = self.segment_deltas(k);
            total += do_arc_test(dx0, dy0, dx1, dy1, dx2, dy2);
        }
        total
    }

    /// Arc length of one segment (0-based index).
    #[must_use]
    pub fn segment_arc_length(&self, seg: usize) -> Scalar {
        let Some(k) = self.segment_start(seg) else {
            return 0.0;
        };
        let (dx0, dy0, dx1, dy1, dx2, dy2) = self.segment_deltas(k);
        do_arc_test(dx0, dy0, dx1, dy1, dx2, dy2)
    }

    /// Time at which the running arc length reaches `arc_len`.
    ///
    /// Open paths clamp to `[0, n]`. On cycles, a negative goal traverses
    /// backwards (negated result) and a goal beyond the total length first
    /// consumes whole-cycle multiples.
    #[must_use]
    pub fn arc_time(&self, arc_len: Scalar) -> Scalar {
        if self.head().is_none() {
            return 0.0;
        }
        let n = self.path_length();
        if n == 0 {
            return 0.0;
        }
        let is_cycle = self.is_cycle();

        if arc_len < 0.0 {
            if !is_cycle {
                return 0.0;
            }
            let rev = self.reverse();
            return -rev.arc_time(-arc_len);
        }
        if arc_len == 0.0 {
            return 0.0;
        }

        let mut t_total = 0.0;
        let mut remaining = arc_len;
        for seg in 0..n {
            if remaining <= 0.0 {
                break;
            }
            let Some(k) = self.segment_start(seg) else {
                break;
            };
            let (dx0, dy0, dx1, dy1, dx2, dy2) = self.segment_deltas(k);
            let v0 = dx0.hypot(dy0);
            let v2 = dx2.hypot(dy2);
            let vx02 = (dx0 + dx2) / 2.0 + dx1;
            let vy02 = (dy0 + dy2) / 2.0 + dy1;
            let v02 = vx02.hypot(vy02);

            let t = arc_test_with_goal(
                dx0,
                dy0,
                dx1,
                dy1,
                dx2,
                dy2,
                v0,
                v02,
                v2,
                remaining,
                ARC_TOLERANCE,
            );
            if t < 0.0 {
                // Goal reached in this segment at local time t + 2.
                t_total += t + 2.0;
                remaining = 0.0;
            } else {
                t_total += 1.0;
                remaining -= t;
            }

            if seg == n - 1 && is_cycle && remaining > 0.0 {
                let total = self.arc_length();
                if total > 0.0 && remaining > total {
                    let full = (remaining / total).floor();
                    #[allow(clippy::cast_precision_loss)]
                    {
                        t_total += full * n as Scalar;
                    }
                    remaining -= full * total;
                }
            }
        }
        t_total
    }

    /// Derivative control differences of the segment starting at `k`:
    /// `(P1-P0, P2-P1, P3-P2)` componentwise.
    fn segment_deltas(&self, k: KnotId) -> (Scalar, Scalar, Scalar, Scalar, Scalar, Scalar) {
        let q = self.next(k);
        let kp = &self[k];
        let kq = &self[q];
        let (rx, ry) = kp.right_control();
        let (lx, ly) = kq.left_control();
        (
            rx - kp.x,
            ry - kp.y,
            lx - rx,
            ly - ry,
            kq.x - lx,
            kq.y - ly,
        )
    }
}

/// Arc length of a cubic given its derivative control differences.
fn do_arc_test(dx0: Scalar, dy0: Scalar, dx1: Scalar, dy1: Scalar, dx2: Scalar, dy2: Scalar) -> Scalar {
    let v0 = dx0.hypot(dy0);
    let v2 = dx2.hypot(dy2);
    let vx02 = (dx0 + dx2) / 2.0 + dx1;
    let vy02 = (dy0 + dy2) / 2.0 + dy1;
    let v02 = vx02.hypot(vy02);
    arc_test(dx0, dy0, dx1, dy1, dx2, dy2, v0, v02, v2, ARC_TOLERANCE)
}

/// Recursive Simpson estimate. `v0`, `v2` are the endpoint speeds and `v02`
/// twice the mid-speed of the current piece.
fn arc_test(
    dx0: Scalar,
    dy0: Scalar,
    dx1: Scalar,
    dy1: Scalar,
    dx2: Scalar,
    dy2: Scalar,
    v0: Scalar,
    v02: Scalar,
    v2: Scalar,
    tol: Scalar,
) -> Scalar {
    // Bisect the derivative quadratic.
    let dx01 = (dx0 + dx1) / 2.0;
    let dy01 = (dy0 + dy1) / 2.0;
    let dx12 = (dx1 + dx2) / 2.0;
    let dy12 = (dy1 + dy2) / 2.0;
    let dx02 = (dx01 + dx12) / 2.0;
    let dy02 = (dy01 + dy12) / 2.0;

    // Speeds at the quarter points (times two).
    let vx002 = (dx0 + dx02) / 2.0 + dx01;
    let vy002 = (dy0 + dy02) / 2.0 + dy01;
    let v002 = vx002.hypot(vy002);
    let vx022 = (dx02 + dx2) / 2.0 + dx12;
    let vy022 = (dy02 + dy2) / 2.0 + dy12;
    let v022 = vx022.hypot(vy022);

    let half_v02 = v02 / 2.0;
    let mut arc1 = (v0 + half_v02) / 2.0;
    arc1 = v002 + (arc1 - v002) / 2.0;
    let mut arc2 = (v2 + half_v02) / 2.0;
    arc2 = v022 + (arc2 - v022) / 2.0;
    let arc = arc1 + arc2;

    let simple = is_simple(dx0, dy0, dx1, dy1, dx2, dy2);
    let simply_test = (arc - (v0 + v2) / 2.0 - v02).abs();
    if simple && simply_test <= tol {
        return arc;
    }

    let new_tol = tol * 1.5;
    let a = arc_test(dx0, dy0, dx01, dy01, dx02, dy02, v0, v002, half_v02, new_tol);
    let b = arc_test(dx02, dy02, dx12, dy12, dx2, dy2, half_v02, v022, v2, new_tol);
    // Control differences were not halved with the segment, so halve the sum.
    a + (b - a) / 2.0
}

/// Like [`arc_test`] but watches for `goal`: a negative return `-(2 - t)`
/// reports the goal reached at local time `t`, a positive return is the
/// piece's arc length.
fn arc_test_with_goal(
    dx0: Scalar,
    dy0: Scalar,
    dx1: Scalar,
    dy1: Scalar,
    dx2: Scalar,
    dy2: Scalar,
    v0: Scalar,
    v02: Scalar,
    v2: Scalar,
    goal: Scalar,
    tol: Scalar,
) -> Scalar {
    let dx01 = (dx0 + dx1) / 2.0;
    let dy01 = (dy0 + dy1) / 2.0;
    let dx12 = (dx1 + dx2) / 2.0;
    let dy12 = (dy1 + dy2) / 2.0;
    let dx02 = (dx01 + dx12) / 2.0;
    let dy02 = (dy01 + dy12) / 2.0;

    let vx002 = (dx0 + dx02) / 2.0 + dx01;
    let vy002 = (dy0 + dy02) / 2.0 + dy01;
    let v002 = vx002.hypot(vy002);
    let vx022 = (dx02 + dx2) / 2.0 + dx12;
    let vy022 = (dy02 + dy2) / 2.0 + dy12;
    let v022 = vx022.hypot(vy022);

    let half_v02 = v02 / 2.0;
    let mut arc1 = (v0 + half_v02) / 2.0;
    arc1 = v002 + (arc1 - v002) / 2.0;
    let mut arc2 = (v2 + half_v02) / 2.0;
    arc2 = v022 + (arc2 - v022) / 2.0;
    let arc = arc1 + arc2;

    let simple = is_simple(dx0, dy0, dx1, dy1, dx2, dy2);
    let simply_test = (arc - (v0 + v2) / 2.0 - v02).abs();
    if simple && simply_test <= tol {
        if goal >= arc {
            return arc;
        }
        return solve_for_time(arc, goal);
    }

    let new_tol = tol * 1.5;
    // The recursion sees unhalved control differences, so the goal doubles
    // on the way down.
    let doubled_goal = goal * 2.0;

    let a = arc_test_with_goal(
        dx0, dy0, dx01, dy01, dx02, dy02, v0, v002, half_v02, doubled_goal, new_tol,
    );
    if a < 0.0 {
        // Hit in the first half; rescale local time into [0, 0.5].
        let t = a + 2.0;
        return -(2.0 - t / 2.0);
    }

    let remaining = doubled_goal - a;
    if remaining <= 0.0 {
        return -(2.0 - 0.5);
    }

    let b = arc_test_with_goal(
        dx02, dy02, dx12, dy12, dx2, dy2, half_v02, v022, v2, remaining, new_tol,
    );
    if b < 0.0 {
        // Hit in the second half; rescale into [0.5, 1].
        let t = b + 2.0;
        return -(2.0 - (0.5 + t / 2.0));
    }

    a + (b - a) / 2.0
}

/// Linear interpolation inside a converged simple piece.
///
/// Sufficient at the simplicity tolerance; segments with strongly
/// non-uniform speed may differ from the exact rising-cubic root in the
/// last decimals.
fn solve_for_time(arc: Scalar, goal: Scalar) -> Scalar {
    if arc <= 0.0 {
        return -2.0;
    }
    let t = (goal / arc).min(1.0);
    -(2.0 - t)
}

/// Control differences confined to one quadrant, possibly after a
/// 45-degree rotation.
fn is_simple(dx0: Scalar, dy0: Scalar, dx1: Scalar, dy1: Scalar, dx2: Scalar, dy2: Scalar) -> bool {
    let all_dx_pos = dx0 >= 0.0 && dx1 >= 0.0 && dx2 >= 0.0;
    let all_dx_neg = dx0 <= 0.0 && dx1 <= 0.0 && dx2 <= 0.0;
    if all_dx_pos || all_dx_neg {
        let all_dy_pos = dy0 >= 0.0 && dy1 >= 0.0 && dy2 >= 0.0;
        let all_dy_neg = dy0 <= 0.0 && dy1 <= 0.0 && dy2 <= 0.0;
        if all_dy_pos || all_dy_neg {
            return true;
        }
    }

    let all_ge = dx0 >= dy0 && dx1 >= dy1 && dx2 >= dy2;
    let all_le = dx0 <= dy0 && dx1 <= dy1 && dx2 <= dy2;
    if all_ge || all_le {
        let all_neg_ge = -dx0 >= dy0 && -dx1 >= dy1 && -dx2 >= dy2;
        let all_neg_le = -dx0 <= dy0 && -dx1 <= dy1 && -dx2 <= dy2;
        if all_neg_ge || all_neg_le {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
