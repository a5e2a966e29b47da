//! Envelope construction: sweeping a polygonal pen along a path.
//!
//! [`make_envelope`] produces the closed boundary of the region a convex
//! polygonal pen covers while traversing a path. Stroked cycles are first
//! cut open at the head (forcing a round cap) so both contours come out of
//! one traversal; open paths are doubled with a reversed copy spliced in
//! front, which makes the return trip produce the other side of the
//! outline. After offset preparation has split every cubic at
//! pen-edge direction crossings, the walk translates each piece by its
//! active pen vertex and steps the pen across corners, inserting bridge
//! knots for bevel corners, vertex fans for round ones, offset-line
//! intersections for miters and extruded flats for squared caps.
//!
//! The result replaces stroking: it is filled with the source path's stroke
//! colour and carries no pen of its own.

use log::trace;

use crate::math::{
    make_fraction, pyth_add, take_fraction, FRACTION_HALF, NEAR_ZERO_ANGLE, UNITY,
};
use crate::offset::{insert_knot, offset_prep, pen_next, pen_prev, pen_walk, remove_cubic, ZERO_OFF};
use crate::path::{KnotId, Path};
use crate::pen::Pen;
use crate::types::{Knot, KnotOrigin, Point, Scalar, Side};

/// Iteration cap for the envelope walk; generous compared to any real
/// knot count but keeps a corrupted ring from spinning forever.
const MAX_ENVELOPE_STEPS: usize = 5000;

/// Incoming/outgoing unit directions (in fraction units) at a corner.
#[derive(Debug, Clone, Copy, Default)]
struct JoinDirections {
    dxin: Scalar,
    dyin: Scalar,
    dxout: Scalar,
    dyout: Scalar,
}

/// Compute the envelope of `path` swept with `pen`.
///
/// The pen must be polygonal; elliptical pens are a backend stroke and
/// return `None`, as does an empty path.
#[must_use]
pub fn make_envelope(path: &Path, pen: &Pen) -> Option<Path> {
    let verts = pen.polygon()?;
    let pen_n = verts.len();
    if pen_n == 0 {
        return None;
    }
    path.head()?;

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let ljoin = path.style.line_join as i32;
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let mut lcap = path.style.line_cap as i32;
    let miterlim = path.style.miter_limit;

    let mut c = path.copy();
    c.envelope = None;

    // A stroked cycle is cut open at the head so the traversal covers both
    // the outer and inner contour; the cap becomes round.
    let head0 = c.head()?;
    if !c[head0].left.is_endpoint() {
        trace!("make_envelope: cutting cycle at head");
        let (head0_x, head0_y) = (c[head0].x, c[head0].y);
        let cut = insert_knot(&mut c, head0, head0_x, head0_y);
        c[cut].left = Side::Endpoint;
        c[head0].right = Side::Endpoint;
        c.head = cut.0;
        lcap = 1;
    }

    // Open paths get a reversed copy spliced in front: the combined ring
    // runs out along the path and back along its mirror.
    let head = c.head()?;
    let mut spec_p1 = None;
    let mut spec_p2 = None;
    if c[head].left.is_endpoint() {
        let (p1, p2) = htap_ypoc(&mut c, head);
        spec_p1 = Some(p1);
        spec_p2 = Some(p2);
        c[p1].origin = KnotOrigin::Program;

        let p1_next = c.next(p1);
        c.knots[p2.0].next = p1_next.0;
        c.knots[p1_next.0].prev = p2.0;
        c.knots[p1.0].next = head.0;
        c.knots[head.0].prev = p1.0;
        remove_cubic(&mut c, p1);
        c.head = p1.0;

        if c.next(p1) == p1 {
            // A single point: its envelope is the pen itself.
            let (x, y) = (c[p1].x, c[p1].y);
            c[p1].left = Side::Explicit { x, y };
            c[p1].right = Side::Explicit { x, y };
        } else {
            c[p2].origin = KnotOrigin::Program;
            remove_cubic(&mut c, p2);
        }
    }

    let spec_offset = offset_prep(&mut c, verts);
    let h = pen_walk(0, spec_offset, pen_n);
    let mut w = h;

    let c_head = c.head()?;
    let mut p = c_head;
    let mut passed_spec_p2 = false;

    for _ in 0..MAX_ENVELOPE_STEPS {
        let q0 = c.next(p);
        let mut q = q0;

        // Save the corner's untranslated anchor; pen-walk knots fan around
        // it.
        let qx = c[q].x;
        let qy = c[q].y;

        let mut k = c[q].info;
        let k0 = k;
        let w0 = w;

        let mut join_type = 0;
        let mut dirs = JoinDirections::default();
        if k != ZERO_OFF {
            if k < ZERO_OFF {
                // Inner turns always bevel.
                join_type = 2;
            } else {
                if Some(q) != spec_p1 && Some(q) != spec_p2 {
                    join_type = ljoin;
                } else if lcap == 2 {
                    join_type = 3;
                } else {
                    join_type = 2 - lcap;
                }
                // The inner contour bevels regardless of style; miters
                // there would spike inward.
                if join_type == 0 && passed_spec_p2 {
                    join_type = 2;
                }
                if join_type == 0 || join_type == 3 {
                    let (jt, d) =
                        compute_join_type(&c, p, q, c_head, verts, w, h, join_type, miterlim);
                    join_type = jt;
                    dirs = d;
                }
            }
        }

        // Translate this piece by the current pen vertex: the essential
        // offset curve.
        let wp = verts[w];
        let (qrx, qry) = c[q].right_control();
        let (qlx, qly) = c[q].left_control();
        let (prx, pry) = c[p].right_control();
        c[p].right = Side::Explicit {
            x: prx + wp.x,
            y: pry + wp.y,
        };
        c[q].left = Side::Explicit {
            x: qlx + wp.x,
            y: qly + wp.y,
        };
        c[q].x += wp.x;
        c[q].y += wp.y;
        c[q].right = Side::Explicit { x: qrx, y: qry };

        // Walk the pen across the corner, inserting a knot at each vertex
        // for round joins and at the final vertex always.
        while k != ZERO_OFF {
            if k > ZERO_OFF {
                w = pen_next(w, pen_n);
                k -= 1;
            } else {
                w = pen_prev(w, pen_n);
                k += 1;
            }
            if join_type == 1 || k == ZERO_OFF {
                q = insert_knot(&mut c, q, qx + verts[w].x, qy + verts[w].y);
            }
        }

        if q != c.next(p) {
            insert_join_knots(&mut c, p, q, verts, w, w0, k0, join_type, dirs);
        }

        p = q;
        if Some(q0) == spec_p2 {
            passed_spec_p2 = true;
        }
        if q0 == c_head {
            break;
        }
    }

    Some(c)
}

/// Solve-time hook: attach the envelope of a polygonal pen to the path,
/// restyled as a pure fill.
pub(crate) fn attach_envelope(path: &mut Path) {
    let Some(pen) = path.style.pen.clone() else {
        return;
    };
    if pen.is_elliptical() {
        return;
    }
    if let Some(mut env) = make_envelope(path, &pen) {
        env.style = path.style.clone();
        env.style.fill = path.style.stroke;
        env.style.stroke = None;
        env.style.stroke_width = 0.0;
        env.style.pen = None;
        env.envelope = None;
        path.envelope = Some(Box::new(env));
    }
}

/// Build a reversed copy of the ring starting at `head` inside the same
/// arena.
///
/// Returns `(spec_p1, spec_p2)`: the mirror of `head` (the reversed list's
/// entry point) and the original tail. The mirror knots have their sides
/// swapped and are linked in reverse order, closing on `spec_p1`.
fn htap_ypoc(path: &mut Path, head: KnotId) -> (KnotId, KnotId) {
    let q = KnotId(path.alloc(Knot::new(0.0, 0.0)));
    let mut qq = q;
    let mut pp = head;
    loop {
        let src = path[pp].clone();
        {
            let dst = &mut path.knots[qq.0];
            dst.x = src.x;
            dst.y = src.y;
            dst.left = src.right;
            dst.right = src.left;
            dst.origin = src.origin;
            dst.info = src.info;
        }
        if path.next(pp) == head {
            path.knots[q.0].next = qq.0;
            path.knots[qq.0].prev = q.0;
            return (q, pp);
        }
        let rr = KnotId(path.alloc(Knot::new(0.0, 0.0)));
        path.knots[rr.0].next = qq.0;
        path.knots[qq.0].prev = rr.0;
        qq = rr;
        pp = path.next(pp);
    }
}

/// Decide whether a miter or squared join survives at the corner `q`,
/// computing the unit corner directions. Falls back to bevel when a
/// direction degenerates or the miter limit is exceeded.
fn compute_join_type(
    c: &Path,
    p: KnotId,
    q: KnotId,
    c_head: KnotId,
    verts: &[Point],
    w: usize,
    h: usize,
    join_type: i32,
    miterlim: Scalar,
) -> (i32, JoinDirections) {
    // Incoming direction, with fallbacks for collapsed controls.
    let (qlx, qly) = c[q].left_control();
    let mut dxin = c[q].x - qlx;
    let mut dyin = c[q].y - qly;
    if dxin == 0.0 && dyin == 0.0 {
        let (prx, pry) = c[p].right_control();
        dxin = c[q].x - prx;
        dyin = c[q].y - pry;
        if dxin == 0.0 && dyin == 0.0 {
            dxin = c[q].x - c[p].x;
            dyin = c[q].y - c[p].y;
            if p != c_head {
                // p has already been translated by the pen.
                dxin += verts[w].x;
                dyin += verts[w].y;
            }
        }
    }
    let tmp = pyth_add(dxin, dyin);
    if tmp == 0.0 {
        return (2, JoinDirections::default());
    }
    let dxin = make_fraction(dxin, tmp);
    let dyin = make_fraction(dyin, tmp);

    // Outgoing direction.
    let r = c.next(q);
    let (qrx, qry) = c[q].right_control();
    let mut dxout = qrx - c[q].x;
    let mut dyout = qry - c[q].y;
    if dxout == 0.0 && dyout == 0.0 {
        let (rlx, rly) = c[r].left_control();
        dxout = rlx - c[q].x;
        dyout = rly - c[q].y;
        if dxout == 0.0 && dyout == 0.0 {
            dxout = c[r].x - c[q].x;
            dyout = c[r].y - c[q].y;
        }
    }
    if q == c_head {
        dxout -= verts[h].x;
        dyout -= verts[h].y;
    }
    let tmp = pyth_add(dxout, dyout);
    let (dxout, dyout) = if tmp == 0.0 {
        (dxout, dyout)
    } else {
        (make_fraction(dxout, tmp), make_fraction(dyout, tmp))
    };

    let dirs = JoinDirections {
        dxin,
        dyin,
        dxout,
        dyout,
    };

    if join_type == 0 {
        // Demote miters that would exceed the miter limit.
        let r1 = take_fraction(dxin, dxout);
        let r2 = take_fraction(dyin, dyout);
        let cos_angle = (r1 + r2) / 2.0 + FRACTION_HALF;
        let miter_test = take_fraction(miterlim, cos_angle);
        if miter_test < UNITY && miterlim * miter_test < UNITY {
            return (2, JoinDirections::default());
        }
    }
    (join_type, dirs)
}

/// After the pen walk has inserted the corner's fan, add the miter apex or
/// the two squared-cap vertices.
#[allow(clippy::too_many_arguments)]
fn insert_join_knots(
    c: &mut Path,
    p: KnotId,
    q: KnotId,
    verts: &[Point],
    w: usize,
    w0: usize,
    k0: i32,
    join_type: i32,
    dirs: JoinDirections,
) {
    let p_next = c.next(p);
    match join_type {
        0 => {
            if let Some(r) = insert_miter_join(c, p_next, q, dirs) {
                let (x, y) = (c[r].x, c[r].y);
                c[r].right = Side::Explicit { x, y };
            }
        }
        3 => insert_squared_join(c, p_next, q, verts, w, w0, k0, dirs),
        _ => {}
    }
}

/// Intersect the two offset lines meeting at a corner and insert the apex
/// between the walk's first and last knots. Near-parallel corners insert
/// nothing.
fn insert_miter_join(c: &mut Path, p_next: KnotId, q: KnotId, d: JoinDirections) -> Option<KnotId> {
    let r1 = take_fraction(d.dyout, d.dxin);
    let r2 = take_fraction(d.dxout, d.dyin);
    let det = r1 - r2;
    if det.abs() < NEAR_ZERO_ANGLE {
        return None;
    }
    let tmp = c[q].x - c[p_next].x;
    let r1 = take_fraction(tmp, d.dyout);
    let tmp = c[q].y - c[p_next].y;
    let r2 = take_fraction(tmp, d.dxout);
    let r1 = make_fraction(r1 - r2, det);
    let xsub = take_fraction(r1, d.dxin);
    let ysub = take_fraction(r1, d.dyin);
    Some(insert_knot(
        c,
        p_next,
        c[p_next].x + xsub,
        c[p_next].y + ysub,
    ))
}

/// Extrude the squared cap: two vertices pushed out by the pen's maximum
/// height along the incoming and outgoing directions.
#[allow(clippy::too_many_arguments)]
fn insert_squared_join(
    c: &mut Path,
    p: KnotId,
    q: KnotId,
    verts: &[Point],
    w: usize,
    w0: usize,
    k0: i32,
    d: JoinDirections,
) {
    let n = verts.len();
    let mut htx = verts[w].y - verts[w0].y;
    let mut hty = verts[w0].x - verts[w].x;
    if htx == 0.0 && hty == 0.0 {
        return;
    }
    while htx.abs() < FRACTION_HALF && hty.abs() < FRACTION_HALF {
        htx *= 2.0;
        hty *= 2.0;
    }

    // Tallest pen vertex in the cap-normal direction.
    let mut max_ht = 0.0;
    let mut kk = ZERO_OFF;
    let mut ww = w;
    loop {
        if kk > k0 {
            ww = pen_next(ww, n);
            kk -= 1;
        } else {
            ww = pen_prev(ww, n);
            kk += 1;
        }
        if kk == k0 {
            break;
        }
        let tmp = verts[ww].x - verts[w0].x;
        let r1 = take_fraction(tmp, htx);
        let tmp = verts[ww].y - verts[w0].y;
        let r2 = take_fraction(tmp, hty);
        let tmp = r1 + r2;
        if tmp > max_ht {
            max_ht = tmp;
        }
    }

    let r1 = take_fraction(d.dxin, htx);
    let r2 = take_fraction(d.dyin, hty);
    let mut tmp = r1 + r2;
    if tmp != 0.0 {
        tmp = make_fraction(max_ht, tmp);
    }
    let xsub = take_fraction(tmp, d.dxin);
    let ysub = take_fraction(tmp, d.dyin);
    let r = insert_knot(c, p, c[p].x + xsub, c[p].y + ysub);

    let r1 = take_fraction(d.dxout, htx);
    let r2 = take_fraction(d.dyout, hty);
    let mut tmp = r1 + r2;
    if tmp != 0.0 {
        tmp = make_fraction(max_ht, tmp);
    }
    let xsub = take_fraction(tmp, d.dxout);
    let ysub = take_fraction(tmp, d.dyout);
    insert_knot(c, r, c[q].x + xsub, c[q].y + ysub);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
