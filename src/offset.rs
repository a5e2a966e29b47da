//! Offset preparation for pen sweeping.
//!
//! Before the envelope of a polygonal pen can be walked, every cubic must
//! be split wherever its direction crosses a pen-edge direction, so that
//! each piece keeps a single active pen vertex. [`offset_prep`] performs
//! that pass: it computes a signed pen-walk step count per segment (stored
//! in the knot's scratch `info` field, biased by [`ZERO_OFF`]), splits
//! cubics at direction crossings via [`crossing_point`], and returns the
//! net `spec_offset` the envelope builder uses to align its starting pen
//! vertex.
//!
//! The quadratic that drives all the splitting is the projection of the
//! cubic's derivative onto the current pen-edge direction; its first sign
//! change is found by the bit-by-bit `crossing_point` bisection, which is
//! why the arithmetic here must not be reordered.

use log::trace;

use crate::math::{
    ab_vs_cd, crossing_point, make_fraction, negate, of_the_way, take_fraction, FRACTION_HALF,
    FRACTION_ONE,
};
use crate::path::{KnotId, Path};
use crate::types::{Knot, KnotOrigin, Point, Scalar, Side};

/// Bias added to pen-walk step counts so the scratch field stays
/// non-negative.
pub(crate) const ZERO_OFF: i32 = 16384;

// ---------------------------------------------------------------------------
// Pen ring stepping
// ---------------------------------------------------------------------------

/// Step `k` vertices around a pen polygon (negative steps go backwards).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub(crate) fn pen_walk(w: usize, k: i32, n: usize) -> usize {
    let n_i = n as i64;
    (w as i64 + i64::from(k)).rem_euclid(n_i) as usize
}

pub(crate) fn pen_next(w: usize, n: usize) -> usize {
    (w + 1) % n
}

pub(crate) fn pen_prev(w: usize, n: usize) -> usize {
    (w + n - 1) % n
}

/// Count signed pen steps from vertex `w` until the pen edge is no longer
/// behind the direction `(dx, dy)`.
pub(crate) fn get_turn_amt(pen: &[Point], w: usize, dx: Scalar, dy: Scalar, ccw: bool) -> i32 {
    let n = pen.len();
    let mut w = w;
    let mut s = 0;
    if ccw {
        let mut ww = pen_next(w, n);
        loop {
            let t = ab_vs_cd(dy, pen[ww].x - pen[w].x, dx, pen[ww].y - pen[w].y);
            if t < 0.0 {
                break;
            }
            s += 1;
            w = ww;
            ww = pen_next(ww, n);
            if t <= 0.0 {
                break;
            }
        }
    } else {
        let mut ww = pen_prev(w, n);
        let mut t = ab_vs_cd(dy, pen[w].x - pen[ww].x, dx, pen[w].y - pen[ww].y);
        while t < 0.0 {
            s -= 1;
            w = ww;
            ww = pen_prev(ww, n);
            t = ab_vs_cd(dy, pen[w].x - pen[ww].x, dx, pen[w].y - pen[ww].y);
        }
    }
    s
}

// ---------------------------------------------------------------------------
// Ring surgery
// ---------------------------------------------------------------------------

/// Split the cubic between `p` and its successor at `t` (fraction units),
/// inserting a program-origin knot at the split point. Returns the new knot.
pub(crate) fn split_cubic(path: &mut Path, p: KnotId, t: Scalar) -> KnotId {
    let q = path.next(p);
    let (prx, pry) = path[p].right_control();
    let (qlx, qly) = path[q].left_control();

    let vx = of_the_way(prx, qlx, t);
    let new_prx = of_the_way(path[p].x, prx, t);
    let new_qlx = of_the_way(qlx, path[q].x, t);
    let rlx = of_the_way(new_prx, vx, t);
    let rrx = of_the_way(vx, new_qlx, t);
    let rx = of_the_way(rlx, rrx, t);

    let vy = of_the_way(pry, qly, t);
    let new_pry = of_the_way(path[p].y, pry, t);
    let new_qly = of_the_way(qly, path[q].y, t);
    let rly = of_the_way(new_pry, vy, t);
    let rry = of_the_way(vy, new_qly, t);
    let ry = of_the_way(rly, rry, t);

    path[p].right = Side::Explicit {
        x: new_prx,
        y: new_pry,
    };
    path[q].left = Side::Explicit {
        x: new_qlx,
        y: new_qly,
    };

    let mut r = Knot::new(rx, ry);
    r.left = Side::Explicit { x: rlx, y: rly };
    r.right = Side::Explicit { x: rrx, y: rry };
    r.origin = KnotOrigin::Program;
    let idx = path.alloc(r);
    path.knots[idx].next = q.0;
    path.knots[idx].prev = p.0;
    path.knots[p.0].next = idx;
    path.knots[q.0].prev = idx;
    KnotId(idx)
}

/// Remove the knot after `p`, merging the two cubics: `p` adopts the
/// removed knot's outgoing control. The removed slot is orphaned.
pub(crate) fn remove_cubic(path: &mut Path, p: KnotId) {
    let q = path.next(p);
    let (rx, ry) = path[q].right_control();
    let after = path.next(q);
    path.knots[p.0].next = after.0;
    path.knots[after.0].prev = p.0;
    path[p].right = Side::Explicit { x: rx, y: ry };
}

/// Insert an explicit knot at `(x, y)` after `q`: the new knot adopts `q`'s
/// outgoing control and both fresh sides collapse to their anchors, so the
/// new edge is straight.
pub(crate) fn insert_knot(path: &mut Path, q: KnotId, x: Scalar, y: Scalar) -> KnotId {
    let (qrx, qry) = path[q].right_control();
    let after = path.next(q);

    let mut r = Knot::new(x, y);
    r.right = Side::Explicit { x: qrx, y: qry };
    r.left = Side::Explicit { x, y };
    r.origin = KnotOrigin::Program;
    let idx = path.alloc(r);
    path.knots[idx].next = after.0;
    path.knots[idx].prev = q.0;
    path.knots[q.0].next = idx;
    path.knots[after.0].prev = idx;

    let (qx, qy) = (path[q].x, path[q].y);
    path[q].right = Side::Explicit { x: qx, y: qy };
    KnotId(idx)
}

// ---------------------------------------------------------------------------
// Offset prep
// ---------------------------------------------------------------------------

fn sign_of(v: Scalar) -> i32 {
    if v < 0.0 {
        -1
    } else if v > 0.0 {
        1
    } else {
        0
    }
}

fn max_abs6(a: Scalar, b: Scalar, c: Scalar, d: Scalar, e: Scalar, f: Scalar) -> Scalar {
    a.abs()
        .max(b.abs())
        .max(c.abs())
        .max(d.abs())
        .max(e.abs())
        .max(f.abs())
}

/// True when the cubic from `p` to `r` has collapsed onto `p`'s anchor.
fn cubic_is_degenerate(path: &Path, p: KnotId, r: KnotId) -> bool {
    let (prx, pry) = path[p].right_control();
    let (rlx, rly) = path[r].left_control();
    path[p].x == prx
        && path[p].y == pry
        && path[p].x == rlx
        && path[p].y == rly
        && path[p].x == path[r].x
        && path[p].y == path[r].y
}

/// Prepare `path` for sweeping with the polygonal pen `pen` (convex,
/// counter-clockwise vertices).
///
/// Splits cubics at pen-edge direction crossings, stamps the biased
/// pen-walk delta of each segment into its start knot's `info`, removes
/// degenerate cubics (carrying their delta forward), and returns the
/// `spec_offset` used to position the envelope builder's first pen vertex.
pub(crate) fn offset_prep(path: &mut Path, pen: &[Point]) -> i32 {
    let Some(start) = path.head() else {
        return 0;
    };
    let pen_n = pen.len();
    if pen_n == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let n = pen_n as i32;

    // Initial incoming direction from the pen polygon around its head.
    let hn = pen_next(0, pen_n);
    let hp = pen_prev(0, pen_n);
    let mut dxin = pen[hn].x - pen[hp].x;
    let mut dyin = pen[hn].y - pen[hp].y;
    if dxin == 0.0 && dyin == 0.0 {
        dxin = pen[hp].y - pen[0].y;
        dyin = pen[0].x - pen[hp].x;
    }

    let mut w0 = 0usize;
    let mut c = start;
    let c0 = c;
    let mut p = c;
    let mut k_needed = 0i32;
    let (mut dx0, mut dy0) = (0.0, 0.0);

    loop {
        let mut q = path.next(p);
        path[p].info = ZERO_OFF + k_needed;
        k_needed = 0;

        // Derivative control differences, scaled into fraction range.
        let (prx, pry) = path[p].right_control();
        let (qlx, qly) = path[q].left_control();
        let mut x0 = prx - path[p].x;
        let mut x2 = path[q].x - qlx;
        let mut x1 = qlx - prx;
        let mut y0 = pry - path[p].y;
        let mut y2 = path[q].y - qly;
        let mut y1 = qly - pry;

        let mut max_coef = max_abs6(x0, x1, x2, y0, y1, y2);
        if max_coef != 0.0 {
            while max_coef < FRACTION_HALF {
                max_coef *= 2.0;
                x0 *= 2.0;
                x1 *= 2.0;
                x2 *= 2.0;
                y0 *= 2.0;
                y1 *= 2.0;
                y2 *= 2.0;
            }

            // First nonzero derivative control is the entry direction.
            let (mut dx, mut dy) = (x0, y0);
            if dx == 0.0 && dy == 0.0 {
                dx = x1;
                dy = y1;
                if dx == 0.0 && dy == 0.0 {
                    dx = x2;
                    dy = y2;
                }
            }
            if p == c {
                dx0 = dx;
                dy0 = dy;
            }

            // Align the pen with the entry direction.
            let ccw = ab_vs_cd(dy, dxin, dx, dyin) >= 0.0;
            let mut turn_amt = get_turn_amt(pen, w0, dx, dy, ccw);
            let w = pen_walk(w0, turn_amt, pen_n);
            w0 = w;
            path[p].info += turn_amt;

            // Exit direction feeds the next iteration.
            dxin = x2;
            dyin = y2;
            if dxin == 0.0 && dyin == 0.0 {
                dxin = x1;
                dyin = y1;
                if dxin == 0.0 && dyin == 0.0 {
                    dxin = x0;
                    dyin = y0;
                }
            }

            // Net turning sense of this cubic.
            let mut d_sign = sign_of(ab_vs_cd(dx, dyin, dxin, dy));
            if d_sign == 0 {
                let u0 = path[q].x - path[p].x;
                let u1 = path[q].y - path[p].y;
                let t_sum =
                    (ab_vs_cd(dx, u1, u0, dy) + ab_vs_cd(u0, dyin, dxin, u1)) / 2.0;
                d_sign = sign_of(t_sum);
            }
            if d_sign == 0 {
                d_sign = if dx == 0.0 {
                    if dy > 0.0 {
                        1
                    } else {
                        -1
                    }
                } else if dx > 0.0 {
                    1
                } else {
                    -1
                };
            }

            // Does the cubic double back? Probe the curvature quadratic at
            // its own crossing.
            let r1 = take_fraction(x0, y2);
            let r2 = take_fraction(x2, y0);
            let mut t0 = (r1 - r2) / 2.0;
            let r1 = take_fraction(x1, y0 + y2);
            let r2 = take_fraction(y1, x0 + x2);
            let t1 = (r1 - r2) / 2.0;
            if t0 == 0.0 {
                t0 = Scalar::from(d_sign);
            }
            let (u0v, u1v, v0v, v1v, t_cross);
            if t0 > 0.0 {
                t_cross = crossing_point(t0, t1, -t0);
                u0v = of_the_way(x0, x1, t_cross);
                u1v = of_the_way(x1, x2, t_cross);
                v0v = of_the_way(y0, y1, t_cross);
                v1v = of_the_way(y1, y2, t_cross);
            } else {
                t_cross = crossing_point(-t0, t1, t0);
                u0v = of_the_way(x2, x1, t_cross);
                u1v = of_the_way(x1, x0, t_cross);
                v0v = of_the_way(y2, y1, t_cross);
                v1v = of_the_way(y1, y0, t_cross);
            }
            let tmp1 = of_the_way(u0v, u1v, t_cross);
            let tmp2 = of_the_way(v0v, v1v, t_cross);
            let ss = take_fraction(x0 + x2, tmp1) + take_fraction(y0 + y2, tmp2);

            turn_amt = get_turn_amt(pen, w, dxin, dyin, d_sign > 0);
            if ss < 0.0 {
                turn_amt -= d_sign * n;
            }

            let ww = pen_prev(w, pen_n);

            // Projection of the derivative onto the pen edge w.prev -> w.
            let du = pen[ww].x - pen[w].x;
            let dv = pen[ww].y - pen[w].y;
            let (mut t0c, mut t1c, mut t2c);
            if du.abs() >= dv.abs() {
                let s = make_fraction(dv, du);
                t0c = take_fraction(x0, s) - y0;
                t1c = take_fraction(x1, s) - y1;
                t2c = take_fraction(x2, s) - y2;
                if du < 0.0 {
                    t0c = negate(t0c);
                    t1c = negate(t1c);
                    t2c = negate(t2c);
                }
            } else {
                let s = make_fraction(du, dv);
                t0c = x0 - take_fraction(y0, s);
                t1c = x1 - take_fraction(y1, s);
                t2c = x2 - take_fraction(y2, s);
                if dv < 0.0 {
                    t0c = negate(t0c);
                    t1c = negate(t1c);
                    t2c = negate(t2c);
                }
            }
            if t0c < 0.0 {
                t0c = 0.0;
            }

            // First crossing of the projection, validated against the edge.
            let mut t = crossing_point(t0c, t1c, t2c);
            if turn_amt >= 0 {
                if t2c < 0.0 {
                    t = FRACTION_ONE + 1.0;
                } else {
                    let u0c = of_the_way(x0, x1, t);
                    let u1c = of_the_way(x1, x2, t);
                    let tmp = of_the_way(u0c, u1c, t);
                    let mut ss_c = take_fraction(-du, tmp);
                    let v0c = of_the_way(y0, y1, t);
                    let v1c = of_the_way(y1, y2, t);
                    let tmp = of_the_way(v0c, v1c, t);
                    ss_c += take_fraction(-dv, tmp);
                    if ss_c < 0.0 {
                        t = FRACTION_ONE + 1.0;
                    }
                }
            } else if t > FRACTION_ONE {
                t = FRACTION_ONE;
            }

            if t > FRACTION_ONE {
                fin_offset_prep(path, p, pen, w, x0, x1, x2, y0, y1, y2, 1, turn_amt);
            } else {
                // Split at the crossing; both pieces get their own pass.
                split_cubic(path, p, t);
                let r = path.next(p);

                let x1a = of_the_way(x0, x1, t);
                x1 = of_the_way(x1, x2, t);
                let x2a = of_the_way(x1a, x1, t);
                let y1a = of_the_way(y0, y1, t);
                y1 = of_the_way(y1, y2, t);
                let y2a = of_the_way(y1a, y1, t);

                fin_offset_prep(path, p, pen, w, x0, x1a, x2a, y0, y1a, y2a, 1, 0);
                x0 = x2a;
                y0 = y2a;
                path[r].info = ZERO_OFF - 1;

                if turn_amt >= 0 {
                    let mut t1c = of_the_way(t1c, t2c, t);
                    if t1c > 0.0 {
                        t1c = 0.0;
                    }
                    let mut t2 = crossing_point(0.0, -t1c, -t2c);
                    if t2 > FRACTION_ONE {
                        t2 = FRACTION_ONE;
                    }

                    split_cubic(path, r, t2);
                    let rn = path.next(r);
                    path[rn].info = ZERO_OFF + 1;

                    let x1a = of_the_way(x1, x2, t2);
                    x1 = of_the_way(x0, x1, t2);
                    let x0a = of_the_way(x1, x1a, t2);
                    let y1a = of_the_way(y1, y2, t2);
                    y1 = of_the_way(y0, y1, t2);
                    let y0a = of_the_way(y1, y1a, t2);

                    fin_offset_prep(path, rn, pen, w, x0a, x1a, x2, y0a, y1a, y2, 1, turn_amt);
                    x2 = x0a;
                    y2 = y0a;
                    fin_offset_prep(path, r, pen, ww, x0, x1, x2, y0, y1, y2, -1, 0);
                } else {
                    fin_offset_prep(path, r, pen, ww, x0, x1, x2, y0, y1, y2, -1, -1 - turn_amt);
                }
            }
            w0 = pen_walk(w0, turn_amt, pen_n);
        }

        // Advance past everything the splits inserted, removing degenerate
        // cubics and carrying their pen-walk delta forward.
        let q0 = q;
        loop {
            let mut r = path.next(p);
            if cubic_is_degenerate(path, p, r) && r != p && r != q {
                k_needed = path[p].info - ZERO_OFF;
                path[p].info = k_needed + path[r].info;
                k_needed = 0;
                if r == c {
                    path[p].info = path[c].info;
                    c = p;
                }
                remove_cubic(path, p);
                r = p;
            }
            p = r;
            if p == q {
                break;
            }
        }
        if q != q0 && (q != c || c == c0) {
            q = path.next(q);
        }
        if q == c {
            break;
        }
    }

    // Normalise the head's accumulated offset and derive spec_offset.
    let spec_offset = path[c].info - ZERO_OFF;
    if path.next(c) == c {
        path[c].info = ZERO_OFF + n;
    } else {
        path[c].info += k_needed;
        let mut wi = w0;
        while wi != 0 {
            path[c].info += 1;
            wi = pen_next(wi, pen_n);
        }
        while path[c].info <= ZERO_OFF - n {
            path[c].info += n;
        }
        while path[c].info > ZERO_OFF {
            path[c].info -= n;
        }
        if path[c].info != ZERO_OFF && ab_vs_cd(dy0, dxin, dx0, dyin) >= 0.0 {
            path[c].info += n;
        }
    }
    trace!("offset_prep: spec_offset {spec_offset}");
    spec_offset
}

/// Split the cubic after `p` repeatedly while its derivative keeps crossing
/// the active pen-edge direction, stamping `rise` into each new knot and
/// consuming `turn_amt` pen steps.
pub(crate) fn fin_offset_prep(
    path: &mut Path,
    p: KnotId,
    pen: &[Point],
    w: usize,
    x0: Scalar,
    x1: Scalar,
    x2: Scalar,
    y0: Scalar,
    y1: Scalar,
    y2: Scalar,
    rise: i32,
    turn_amt: i32,
) {
    let pen_n = pen.len();
    let q = path.next(p);
    let mut p = p;
    let mut w = w;
    let (mut x0, mut x1, mut x2) = (x0, x1, x2);
    let (mut y0, mut y1, mut y2) = (y0, y1, y2);
    let mut turn_amt = turn_amt;

    loop {
        let ww = if rise > 0 {
            pen_next(w, pen_n)
        } else {
            pen_prev(w, pen_n)
        };

        let du = pen[ww].x - pen[w].x;
        let dv = pen[ww].y - pen[w].y;
        let (mut t0, mut t1, mut t2);
        if du.abs() >= dv.abs() {
            let s = make_fraction(dv, du);
            t0 = take_fraction(x0, s) - y0;
            t1 = take_fraction(x1, s) - y1;
            t2 = take_fraction(x2, s) - y2;
            if du < 0.0 {
                t0 = negate(t0);
                t1 = negate(t1);
                t2 = negate(t2);
            }
        } else {
            let s = make_fraction(du, dv);
            t0 = x0 - take_fraction(y0, s);
            t1 = x1 - take_fraction(y1, s);
            t2 = x2 - take_fraction(y2, s);
            if dv < 0.0 {
                t0 = negate(t0);
                t1 = negate(t1);
                t2 = negate(t2);
            }
        }
        if t0 < 0.0 {
            t0 = 0.0;
        }

        let mut t = crossing_point(t0, t1, t2);
        if t >= FRACTION_ONE {
            if turn_amt > 0 {
                t = FRACTION_ONE;
            } else {
                return;
            }
        }

        split_cubic(path, p, t);
        p = path.next(p);
        path[p].info = ZERO_OFF + rise;
        turn_amt -= 1;

        let v = of_the_way(x0, x1, t);
        x1 = of_the_way(x1, x2, t);
        x0 = of_the_way(v, x1, t);
        let v = of_the_way(y0, y1, t);
        y1 = of_the_way(y1, y2, t);
        y0 = of_the_way(v, y1, t);

        if turn_amt < 0 {
            t1 = of_the_way(t1, t2, t);
            if t1 > 0.0 {
                t1 = 0.0;
            }
            let mut t = crossing_point(0.0, -t1, -t2);
            if t > FRACTION_ONE {
                t = FRACTION_ONE;
            }
            turn_amt += 1;
            if t == FRACTION_ONE && path.next(p) != q {
                let pn = path.next(p);
                path[pn].info -= rise;
            } else {
                split_cubic(path, p, t);
                let pn = path.next(p);
                path[pn].info = ZERO_OFF - rise;
                let v = of_the_way(x1, x2, t);
                x1 = of_the_way(x0, x1, t);
                x2 = of_the_way(x1, v, t);
                let v = of_the_way(y1, y2, t);
                y1 = of_the_way(y0, y1, t);
                y2 = of_the_way(y1, v, t);
            }
        }

        w = ww;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bezier::CubicSegment;
    use crate::math::FRACTION_HALF;

    fn square_pen() -> Vec<Point> {
        vec![
            Point::new(-2.0, -2.0),
            Point::new(2.0, -2.0),
            Point::new(2.0, 2.0),
            Point::new(-2.0, 2.0),
        ]
    }

    fn arch() -> Path {
        let mut p = Path::new();
        let mut k0 = Knot::new(0.0, 0.0);
        k0.left = Side::Endpoint;
        k0.right = Side::Explicit { x: 10.0, y: 20.0 };
        p.append(k0);
        let mut k1 = Knot::new(40.0, 0.0);
        k1.left = Side::Explicit { x: 30.0, y: 20.0 };
        k1.right = Side::Endpoint;
        p.append(k1);
        p
    }

    #[test]
    fn pen_walk_wraps_both_ways() {
        assert_eq!(pen_walk(0, 1, 4), 1);
        assert_eq!(pen_walk(0, -1, 4), 3);
        assert_eq!(pen_walk(2, 7, 4), 1);
        assert_eq!(pen_walk(2, -7, 4), 3);
    }

    #[test]
    fn turn_amt_square_pen_rightward() {
        let pen = square_pen();
        // Heading right from the bottom-left vertex: the bottom edge is
        // parallel, one step lands on its far vertex.
        assert_eq!(get_turn_amt(&pen, 0, 1.0, 0.0, true), 1);
        // Heading up from the bottom-left vertex, walking clockwise.
        assert_eq!(get_turn_amt(&pen, 0, 0.0, 1.0, false), 0);
    }

    #[test]
    fn split_cubic_matches_de_casteljau() {
        let mut p = arch();
        let h = p.head().unwrap();
        let reference = CubicSegment::from_ring(&p, h);
        let (left, right) = reference.split(0.5);

        split_cubic(&mut p, h, FRACTION_HALF);
        let r = p.next(h);
        assert_eq!(p[r].origin, KnotOrigin::Program);
        assert!((p[r].x - left.p3.x).abs() < 1e-9);
        assert!((p[r].y - left.p3.y).abs() < 1e-9);
        let (rx, ry) = p[h].right_control();
        assert!((rx - left.p1.x).abs() < 1e-9 && (ry - left.p1.y).abs() < 1e-9);
        let (lx, ly) = p[r].left_control();
        assert!((lx - left.p2.x).abs() < 1e-9 && (ly - left.p2.y).abs() < 1e-9);
        let (rrx, rry) = p[r].right_control();
        assert!((rrx - right.p1.x).abs() < 1e-9 && (rry - right.p1.y).abs() < 1e-9);

        // Ring invariant survives.
        for id in p.ring_ids() {
            assert_eq!(p.next(p.prev(id)), id);
        }
    }

    #[test]
    fn split_then_remove_restores_shape() {
        let mut p = arch();
        let h = p.head().unwrap();
        let before = CubicSegment::from_ring(&p, h);
        split_cubic(&mut p, h, FRACTION_HALF);
        remove_cubic(&mut p, h);
        // Removing the split point merges back; the control polygon is the
        // half-size one, but the endpoints rejoin.
        let after = CubicSegment::from_ring(&p, h);
        assert_eq!(before.p0, after.p0);
        assert_eq!(before.p3, after.p3);
        assert_eq!(p.knot_count(), 2);
    }

    #[test]
    fn insert_knot_straightens_edge() {
        let mut p = arch();
        let h = p.head().unwrap();
        let (old_rx, old_ry) = p[h].right_control();
        let r = insert_knot(&mut p, h, 5.0, 7.0);
        assert_eq!((p[r].x, p[r].y), (5.0, 7.0));
        // New knot carried q's old outgoing control; q's edge to it is
        // straight now.
        let (rx, ry) = p[r].right_control();
        assert_eq!((rx, ry), (old_rx, old_ry));
        assert_eq!(p[h].right_control(), (0.0, 0.0));
        assert_eq!(p[r].left_control(), (5.0, 7.0));
        assert_eq!(p.knot_count(), 3);
    }

    #[test]
    fn offset_prep_stamps_infos() {
        // A cyclic unit-ish square path traversed counter-clockwise.
        let mut p = Path::new();
        let pts = [(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)];
        for i in 0..4 {
            let (x, y) = pts[i];
            let (nx, ny) = pts[(i + 1) % 4];
            let (px, py) = pts[(i + 3) % 4];
            let mut k = Knot::new(x, y);
            k.left = Side::Explicit {
                x: x + (px - x) / 3.0,
                y: y + (py - y) / 3.0,
            };
            k.right = Side::Explicit {
                x: x + (nx - x) / 3.0,
                y: y + (ny - y) / 3.0,
            };
            p.append(k);
        }
        let pen = square_pen();
        offset_prep(&mut p, &pen);

        // Every reachable knot now carries a biased pen-walk delta, and the
        // sum of deltas around the closed path is one full pen revolution.
        let mut total = 0;
        for id in p.ring_ids() {
            total += p[id].info - ZERO_OFF;
        }
        assert_eq!(total, 4, "net pen steps around a CCW cycle");
    }
}
