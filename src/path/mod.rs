//! Paths as cyclic knot rings, and the query operations over them.
//!
//! A [`Path`] owns its knots in an indexed arena: every [`Knot`] carries
//! `next`/`prev` arena indices and the ring invariant
//! `knot(knot(k).prev).next == k` holds at all times. Knots are addressed
//! through the opaque [`KnotId`] handle. Removing a cubic orphans its arena
//! slot; orphans stay allocated (and unreachable) until the path is dropped,
//! which keeps handles stable for the lifetime of the path.
//!
//! Query operations use the `MetaPost` time parameter: the integer part of
//! `t` selects a segment, the fractional part interpolates inside it. Open
//! paths extrapolate tangentially outside `[0, n]`; cycles wrap.

pub mod arclength;
pub mod hobby;

use std::fmt;
use std::ops;

use crate::bezier::CubicSegment;
use crate::types::{Knot, Point, Scalar, Side, Style, Vec2};

// ---------------------------------------------------------------------------
// KnotId
// ---------------------------------------------------------------------------

/// Stable handle to a knot inside one particular [`Path`].
///
/// Ids are never reused within a path's lifetime, so two ids compare equal
/// iff they denote the same knot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnotId(pub(crate) usize);

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// A knot ring with a drawing style and an optional derived envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub(crate) knots: Vec<Knot>,
    pub(crate) head: usize,
    pub style: Style,
    /// Closed outline produced by sweeping a polygonal pen; rendering the
    /// envelope replaces stroking the parent.
    pub envelope: Option<Box<Path>>,
}

impl ops::Index<KnotId> for Path {
    type Output = Knot;

    fn index(&self, id: KnotId) -> &Knot {
        &self.knots[id.0]
    }
}

impl ops::IndexMut<KnotId> for Path {
    fn index_mut(&mut self, id: KnotId) -> &mut Knot {
        &mut self.knots[id.0]
    }
}

impl Path {
    /// An empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// The first knot, if any.
    #[must_use]
    pub fn head(&self) -> Option<KnotId> {
        if self.knots.is_empty() {
            None
        } else {
            Some(KnotId(self.head))
        }
    }

    /// Successor in ring order.
    #[must_use]
    pub fn next(&self, id: KnotId) -> KnotId {
        KnotId(self.knots[id.0].next)
    }

    /// Predecessor in ring order.
    #[must_use]
    pub fn prev(&self, id: KnotId) -> KnotId {
        KnotId(self.knots[id.0].prev)
    }

    /// Attach a knot at the tail, keeping the ring closed.
    pub fn append(&mut self, mut k: Knot) -> KnotId {
        let idx = self.knots.len();
        if self.knots.is_empty() {
            self.head = idx;
            k.next = idx;
            k.prev = idx;
            self.knots.push(k);
        } else {
            let head = self.head;
            let tail = self.knots[head].prev;
            k.prev = tail;
            k.next = head;
            self.knots.push(k);
            self.knots[tail].next = idx;
            self.knots[head].prev = idx;
        }
        KnotId(idx)
    }

    /// Push a knot into the arena without linking it; the caller wires
    /// `next`/`prev` itself (used by the envelope splicing code).
    pub(crate) fn alloc(&mut self, k: Knot) -> usize {
        self.knots.push(k);
        self.knots.len() - 1
    }

    /// Ring order as a vector of ids, head first.
    #[must_use]
    pub fn ring_ids(&self) -> Vec<KnotId> {
        let mut ids = Vec::new();
        let Some(head) = self.head() else {
            return ids;
        };
        let mut cur = head;
        loop {
            ids.push(cur);
            cur = self.next(cur);
            if cur == head {
                break;
            }
        }
        ids
    }

    /// Number of knots reachable on the ring.
    #[must_use]
    pub fn knot_count(&self) -> usize {
        let Some(head) = self.head() else { return 0 };
        let mut n = 0;
        let mut cur = head;
        loop {
            n += 1;
            cur = self.next(cur);
            if cur == head {
                break;
            }
        }
        n
    }

    /// A path is a cycle iff neither the head's left side nor the tail's
    /// right side is an endpoint.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        let Some(head) = self.head() else {
            return false;
        };
        let tail = self.prev(head);
        !self[head].left.is_endpoint() && !self[tail].right.is_endpoint()
    }

    /// Number of segments: the maximum integer value of the time parameter.
    #[must_use]
    pub fn path_length(&self) -> usize {
        let n = self.knot_count();
        if n == 0 {
            return 0;
        }
        if self.is_cycle() {
            n
        } else {
            n - 1
        }
    }

    /// The knot at the start of segment `i` (0-based). Cycles wrap; open
    /// paths return `None` past the end.
    #[must_use]
    pub fn segment_start(&self, i: usize) -> Option<KnotId> {
        let head = self.head()?;
        let n = self.path_length();
        if n == 0 {
            return None;
        }
        let is_cycle = self.is_cycle();
        if !is_cycle && i >= n {
            return None;
        }
        let i = if is_cycle { i % n } else { i };
        let mut cur = head;
        for _ in 0..i {
            cur = self.next(cur);
        }
        Some(cur)
    }

    /// Deep copy with a compacted arena (orphaned slots are dropped).
    #[must_use]
    pub fn copy(&self) -> Self {
        let mut out = Self {
            style: self.style.clone(),
            envelope: self.envelope.as_ref().map(|e| Box::new(e.copy())),
            ..Self::default()
        };
        for id in self.ring_ids() {
            let mut k = self[id].clone();
            k.next = 0;
            k.prev = 0;
            out.append(k);
        }
        out
    }

    /// A copy with direction reversed: knot order, the two sides of every
    /// knot, and the stored controls all swap.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let mut out = Self {
            style: self.style.clone(),
            ..Self::default()
        };
        for &id in self.ring_ids().iter().rev() {
            let old = &self[id];
            let mut k = Knot::new(old.x, old.y);
            k.left = old.right;
            k.right = old.left;
            k.origin = old.origin;
            out.append(k);
        }
        out
    }

    // -----------------------------------------------------------------------
    // Time-parameter queries
    // -----------------------------------------------------------------------

    /// Decompose a time into `(segment, fraction)` for a cycle of `n`
    /// segments, wrapping both directions.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    fn wrap_time(t: Scalar, n: usize) -> (usize, Scalar) {
        let floor = t.floor();
        let frac = t - floor;
        let seg = (floor as i64).rem_euclid(n as i64);
        (seg as usize, frac)
    }

    /// The point at time `t`.
    ///
    /// Open paths extrapolate along the end tangents outside `[0, n]`;
    /// cycles take `t` modulo `n`.
    #[must_use]
    pub fn point_of(&self, t: Scalar) -> Point {
        let Some(head) = self.head() else {
            return Point::ZERO;
        };
        let n = self.path_length();
        if n == 0 {
            return self[head].point();
        }
        let is_cycle = self.is_cycle();

        #[allow(clippy::cast_precision_loss)]
        let n_f = n as Scalar;
        if !is_cycle {
            if t <= 0.0 {
                if t == 0.0 {
                    return self[head].point();
                }
                let d = self.direction_of(0.0);
                let h = self[head].point();
                return Point::new(h.x + t * d.x, h.y + t * d.y);
            }
            if t >= n_f {
                let tail = self.prev(head);
                if t == n_f {
                    return self[tail].point();
                }
                let d = self.direction_of(n_f);
                let excess = t - n_f;
                let e = self[tail].point();
                return Point::new(e.x + excess * d.x, e.y + excess * d.y);
            }
        }

        let (seg, frac) = Self::wrap_time(t, n);
        let Some(knot) = self.segment_start(seg) else {
            return self[head].point();
        };
        CubicSegment::from_ring(self, knot).eval(frac)
    }

    /// Clamp an open-path time and decompose it, pinning `t = n` to the
    /// end of the last segment.
    fn clamped_seg_frac(&self, t: Scalar) -> (usize, Scalar) {
        let n = self.path_length();
        let is_cycle = self.is_cycle();
        #[allow(clippy::cast_precision_loss)]
        let n_f = n as Scalar;
        let t = if is_cycle { t } else { t.clamp(0.0, n_f) };
        let (mut seg, mut frac) = Self::wrap_time(t, n);
        if !is_cycle && t == n_f {
            seg = n - 1;
            frac = 1.0;
        }
        (seg, frac)
    }

    /// The control point coming into time `t`.
    ///
    /// At integer `t` this is the knot's incoming control (the anchor at an
    /// endpoint); at fractional `t` the cubic is split and the split point's
    /// precontrol returned.
    #[must_use]
    pub fn precontrol_of(&self, t: Scalar) -> Point {
        let Some(head) = self.head() else {
            return Point::ZERO;
        };
        if self.path_length() == 0 {
            return self[head].point();
        }
        let (seg, frac) = self.clamped_seg_frac(t);
        let Some(p) = self.segment_start(seg) else {
            return self[head].point();
        };
        if frac == 0.0 {
            let k = &self[p];
            let (x, y) = k.left_control();
            return Point::new(x, y);
        }
        let q = self.next(p);
        let p0 = self[p].point();
        let (rx, ry) = self[p].right_control();
        let (lx, ly) = self[q].left_control();
        let u = 1.0 - frac;
        let q0x = u * p0.x + frac * rx;
        let q0y = u * p0.y + frac * ry;
        let q1x = u * rx + frac * lx;
        let q1y = u * ry + frac * ly;
        Point::new(u * q0x + frac * q1x, u * q0y + frac * q1y)
    }

    /// The control point going out of time `t`.
    #[must_use]
    pub fn postcontrol_of(&self, t: Scalar) -> Point {
        let Some(head) = self.head() else {
            return Point::ZERO;
        };
        if self.path_length() == 0 {
            return self[head].point();
        }
        let (seg, frac) = self.clamped_seg_frac(t);
        let Some(p) = self.segment_start(seg) else {
            return self[head].point();
        };
        if frac == 0.0 {
            let k = &self[p];
            let (x, y) = k.right_control();
            return Point::new(x, y);
        }
        let q = self.next(p);
        let q3 = self[q].point();
        let (rx, ry) = self[p].right_control();
        let (lx, ly) = self[q].left_control();
        let u = 1.0 - frac;
        let q1x = u * rx + frac * lx;
        let q1y = u * ry + frac * ly;
        let q2x = u * lx + frac * q3.x;
        let q2y = u * ly + frac * q3.y;
        Point::new(u * q1x + frac * q2x, u * q1y + frac * q2y)
    }

    /// The tangent direction at time `t`:
    /// `postcontrol_of(t) - precontrol_of(t)`.
    #[must_use]
    pub fn direction_of(&self, t: Scalar) -> Vec2 {
        let post = self.postcontrol_of(t);
        let pre = self.precontrol_of(t);
        post - pre
    }

    // -----------------------------------------------------------------------
    // Subpath
    // -----------------------------------------------------------------------

    /// The portion of the path from `t1` to `t2`.
    ///
    /// `t1 > t2` yields the reversed portion. The result is always open:
    /// its head's left side and tail's right side are endpoints.
    #[must_use]
    pub fn subpath(&self, t1: Scalar, t2: Scalar) -> Self {
        let Some(head) = self.head() else {
            return Self::new();
        };
        let n = self.path_length();
        if n == 0 {
            let mut out = Self::new();
            let k = &self[head];
            let mut single = Knot::new(k.x, k.y);
            single.left = Side::Endpoint;
            single.right = Side::Endpoint;
            out.append(single);
            return out;
        }
        if t1 > t2 {
            return self.subpath(t2, t1).reverse();
        }

        let is_cycle = self.is_cycle();
        #[allow(clippy::cast_precision_loss)]
        let n_f = n as Scalar;
        let (t1, t2) = if is_cycle {
            (t1, t2)
        } else {
            (t1.clamp(0.0, n_f), t2.clamp(0.0, n_f))
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let mut seg1 = t1.floor() as i64;
        let mut frac1 = t1 - t1.floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let mut seg2 = t2.floor() as i64;
        let mut frac2 = t2 - t2.floor();

        #[allow(clippy::cast_possible_wrap)]
        let n_i = n as i64;
        if is_cycle {
            let shift = seg1.rem_euclid(n_i) - seg1;
            seg1 += shift;
            seg2 += shift;
        } else {
            if seg1 >= n_i {
                seg1 = n_i - 1;
                frac1 = 1.0;
            }
            if seg2 >= n_i {
                seg2 = n_i - 1;
                frac2 = 1.0;
            }
        }

        if seg1 == seg2 && frac1 <= frac2 {
            #[allow(clippy::cast_sign_loss)]
            return self.subpath_single_segment(seg1 as usize, frac1, frac2);
        }

        let mut out = Self::new();

        // First partial segment: split at frac1 and keep the tail.
        #[allow(clippy::cast_sign_loss)]
        let Some(k1) = self.segment_start(seg1 as usize % n) else {
            return out;
        };
        let mut cubic = CubicSegment::from_ring(self, k1);
        if frac1 > 0.0 {
            let (_, right) = cubic.split(frac1);
            cubic = right;
        }
        let mut start = Knot::new(cubic.p0.x, cubic.p0.y);
        start.left = Side::explicit(cubic.p0);
        start.right = Side::explicit(cubic.p1);
        out.append(start);
        let mut first_end = Knot::new(cubic.p3.x, cubic.p3.y);
        first_end.left = Side::explicit(cubic.p2);
        first_end.right = Side::explicit(cubic.p3);
        out.append(first_end);

        // Whole intermediate segments.
        for s in (seg1 + 1)..seg2 {
            #[allow(clippy::cast_sign_loss)]
            let Some(k) = self.segment_start(s.rem_euclid(n_i) as usize) else {
                continue;
            };
            let kn = self.next(k);
            let (rx, ry) = self[k].right_control();
            let tail = KnotId(out.knots.len() - 1);
            out[tail].right = Side::Explicit { x: rx, y: ry };
            let (lx, ly) = self[kn].left_control();
            let p = self[kn].point();
            let mut next_knot = Knot::new(p.x, p.y);
            next_knot.left = Side::Explicit { x: lx, y: ly };
            next_knot.right = Side::explicit(p);
            out.append(next_knot);
        }

        // Final partial segment: split at frac2 and keep the head.
        #[allow(clippy::cast_sign_loss)]
        if let Some(k2) = self.segment_start(seg2.rem_euclid(n_i) as usize) {
            let mut last = CubicSegment::from_ring(self, k2);
            if frac2 < 1.0 {
                let (left, _) = last.split(frac2);
                last = left;
            }
            let tail = KnotId(out.knots.len() - 1);
            out[tail].right = Side::explicit(last.p1);
            let mut end = Knot::new(last.p3.x, last.p3.y);
            end.left = Side::explicit(last.p2);
            end.right = Side::explicit(last.p3);
            out.append(end);
        }

        // Open-result invariant.
        if let Some(h) = out.head() {
            out[h].left = Side::Endpoint;
            let tail = out.prev(h);
            out[tail].right = Side::Endpoint;
        }
        out
    }

    fn subpath_single_segment(&self, seg: usize, frac1: Scalar, frac2: Scalar) -> Self {
        let mut out = Self::new();
        let Some(k) = self.segment_start(seg) else {
            return out;
        };
        let cubic = CubicSegment::from_ring(self, k);

        if frac1 == frac2 {
            let p = cubic.eval(frac1);
            let mut single = Knot::new(p.x, p.y);
            single.left = Side::Endpoint;
            single.right = Side::Endpoint;
            out.append(single);
            return out;
        }

        let mut piece = cubic;
        let mut frac2 = frac2;
        if frac1 > 0.0 {
            let (_, right) = piece.split(frac1);
            piece = right;
            frac2 = (frac2 - frac1) / (1.0 - frac1);
        }
        if frac2 < 1.0 {
            let (left, _) = piece.split(frac2);
            piece = left;
        }

        let mut a = Knot::new(piece.p0.x, piece.p0.y);
        a.left = Side::Endpoint;
        a.right = Side::explicit(piece.p1);
        out.append(a);
        let mut b = Knot::new(piece.p3.x, piece.p3.y);
        b.left = Side::explicit(piece.p2);
        b.right = Side::Endpoint;
        out.append(b);
        out
    }

    // -----------------------------------------------------------------------
    // Direction time
    // -----------------------------------------------------------------------

    /// First time at which the tangent points along `(dx, dy)`.
    ///
    /// Antiparallel tangents do not count. Returns `None` when the
    /// direction is never achieved (or for a zero query vector).
    #[must_use]
    pub fn direction_time_of(&self, dx: Scalar, dy: Scalar) -> Option<Scalar> {
        self.head()?;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let n = self.path_length();
        for seg in 0..n {
            let k = self.segment_start(seg)?;
            let cubic = CubicSegment::from_ring(self, k);
            if let Some(t) = direction_time_in_segment(&cubic, dx, dy) {
                #[allow(clippy::cast_precision_loss)]
                return Some(seg as Scalar + t);
            }
        }
        None
    }

    /// First point at which the tangent points along `(dx, dy)`.
    #[must_use]
    pub fn direction_point_of(&self, dx: Scalar, dy: Scalar) -> Option<Point> {
        let t = self.direction_time_of(dx, dy)?;
        Some(self.point_of(t))
    }
}

/// Solve for the first `t` in [0, 1] where the segment's tangent is
/// parallel (same orientation) to `(dx, dy)`.
///
/// Crossing the derivative's control deltas with the query direction gives
/// a quadratic in `t`; roots with an antiparallel tangent are rejected.
fn direction_time_in_segment(cubic: &CubicSegment, dx: Scalar, dy: Scalar) -> Option<Scalar> {
    let ax = cubic.p1.x - cubic.p0.x;
    let ay = cubic.p1.y - cubic.p0.y;
    let bx = cubic.p2.x - cubic.p1.x;
    let by = cubic.p2.y - cubic.p1.y;
    let cx = cubic.p3.x - cubic.p2.x;
    let cy = cubic.p3.y - cubic.p2.y;

    let a = ax * dy - ay * dx;
    let b = bx * dy - by * dx;
    let c = cx * dy - cy * dx;

    let alpha = a - 2.0 * b + c;
    let beta = 2.0 * (b - a);
    let gamma = a;

    const EPS_DEGENERATE: Scalar = 1e-12;
    if alpha.abs() < EPS_DEGENERATE && beta.abs() < EPS_DEGENERATE && gamma.abs() < EPS_DEGENERATE {
        // Constant direction (straight line); accept t = 0 when it points
        // the right way.
        let d = cubic.eval_deriv(0.0);
        if d.x * dx + d.y * dy >= 0.0 {
            return Some(0.0);
        }
        return None;
    }

    const EPS: Scalar = 1e-9;
    let mut best: Option<Scalar> = None;
    for t in solve_quadratic(alpha, beta, gamma) {
        if (-EPS..=1.0 + EPS).contains(&t) {
            let t = t.clamp(0.0, 1.0);
            let d = cubic.eval_deriv(t);
            if d.x * dx + d.y * dy >= 0.0 && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        }
    }
    best
}

/// Real roots of `alpha t^2 + beta t + gamma = 0`, ascending.
fn solve_quadratic(alpha: Scalar, beta: Scalar, gamma: Scalar) -> Vec<Scalar> {
    const EPS: Scalar = 1e-12;
    if alpha.abs() < EPS {
        if beta.abs() < EPS {
            return Vec::new();
        }
        return vec![-gamma / beta];
    }
    let disc = beta * beta - 4.0 * alpha * gamma;
    if disc < -EPS {
        return Vec::new();
    }
    if disc < EPS {
        return vec![-beta / (2.0 * alpha)];
    }
    let sd = disc.sqrt();
    let r1 = (-beta + sd) / (2.0 * alpha);
    let r2 = (-beta - sd) / (2.0 * alpha);
    if r1 > r2 {
        vec![r2, r1]
    } else {
        vec![r1, r2]
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Path {
    /// `MetaPost`-style `show`-ish rendering, mainly for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(head) = self.head() else {
            return Ok(());
        };
        let h = &self[head];
        write!(f, "({:.5},{:.5})", h.x, h.y)?;
        let mut cur = head;
        loop {
            if self[cur].right.is_endpoint() {
                return Ok(());
            }
            let next = self.next(cur);
            let (rx, ry) = self[cur].right_control();
            let (lx, ly) = self[next].left_control();
            let nk = &self[next];
            write!(
                f,
                "..controls ({rx:.5},{ry:.5}) and ({lx:.5},{ly:.5})\n ..({:.5},{:.5})",
                nk.x, nk.y
            )?;
            cur = next;
            if cur == head {
                return write!(f, "\n ..cycle");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Scalar = 1e-9;

    /// Straight line (0,0)--(10,0) with explicit one-third controls.
    fn line_path() -> Path {
        let mut p = Path::new();
        let mut k0 = Knot::new(0.0, 0.0);
        k0.left = Side::Endpoint;
        k0.right = Side::Explicit {
            x: 10.0 / 3.0,
            y: 0.0,
        };
        p.append(k0);
        let mut k1 = Knot::new(10.0, 0.0);
        k1.left = Side::Explicit {
            x: 20.0 / 3.0,
            y: 0.0,
        };
        k1.right = Side::Endpoint;
        p.append(k1);
        p
    }

    /// Triangle cycle with straight-line controls.
    fn triangle_path() -> Path {
        let pts = [(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)];
        let mut p = Path::new();
        for i in 0..3 {
            let j = (i + 1) % 3;
            let prev = (i + 2) % 3;
            let (x, y) = pts[i];
            let right = Point::new(
                x + (pts[j].0 - x) / 3.0,
                y + (pts[j].1 - y) / 3.0,
            );
            let left = Point::new(
                x + (pts[prev].0 - x) / 3.0,
                y + (pts[prev].1 - y) / 3.0,
            );
            p.append(Knot::with_controls(x, y, left, right));
        }
        p
    }

    #[test]
    fn ring_well_formed() {
        let p = triangle_path();
        for id in p.ring_ids() {
            assert_eq!(p.next(p.prev(id)), id);
            assert_eq!(p.prev(p.next(id)), id);
        }
    }

    #[test]
    fn cycle_detection() {
        assert!(!line_path().is_cycle());
        assert!(triangle_path().is_cycle());
    }

    #[test]
    fn path_length_counts_segments() {
        assert_eq!(line_path().path_length(), 1);
        assert_eq!(triangle_path().path_length(), 3);
    }

    #[test]
    fn point_of_line() {
        let p = line_path();
        assert!((p.point_of(0.0).x).abs() < TOL);
        assert!((p.point_of(1.0).x - 10.0).abs() < TOL);
        assert!((p.point_of(0.5).x - 5.0).abs() < TOL);
    }

    #[test]
    fn point_of_extrapolates_open() {
        let p = line_path();
        // direction at the ends is the control-handle vector (10/3, 0);
        // one unit of t extrapolates by that much.
        let before = p.point_of(-0.3);
        assert!((before.x - (-0.3 * 10.0 / 3.0)).abs() < 1e-6);
        let after = p.point_of(1.3);
        assert!((after.x - (10.0 + 0.3 * 10.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn point_of_wraps_cycle() {
        let p = triangle_path();
        let a = p.point_of(0.5);
        let b = p.point_of(3.5);
        let c = p.point_of(-2.5);
        assert!((a.x - b.x).abs() < TOL && (a.y - b.y).abs() < TOL);
        assert!((a.x - c.x).abs() < TOL && (a.y - c.y).abs() < TOL);
    }

    #[test]
    fn direction_of_line_points_right() {
        let p = line_path();
        let d = p.direction_of(0.5);
        assert!(d.x > 0.0);
        assert!(d.y.abs() < TOL);
    }

    #[test]
    fn reverse_involution() {
        let p = triangle_path();
        let rr = p.reverse().reverse();
        let n = p.path_length();
        for i in 0..=(4 * n) {
            #[allow(clippy::cast_precision_loss)]
            let t = i as Scalar / 4.0;
            let a = p.point_of(t);
            let b = rr.point_of(t);
            assert!(
                (a.x - b.x).abs() < TOL && (a.y - b.y).abs() < TOL,
                "mismatch at t={t}: {a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn reverse_swaps_travel() {
        let p = line_path();
        let r = p.reverse();
        assert!((r.point_of(0.0).x - 10.0).abs() < TOL);
        assert!((r.point_of(1.0).x).abs() < TOL);
    }

    #[test]
    fn subpath_endpoints_match() {
        let p = triangle_path();
        let sub = p.subpath(0.25, 2.5);
        let s0 = sub.point_of(0.0);
        #[allow(clippy::cast_precision_loss)]
        let send = sub.point_of(sub.path_length() as Scalar);
        let e0 = p.point_of(0.25);
        let e1 = p.point_of(2.5);
        assert!((s0.x - e0.x).abs() < 1e-6 && (s0.y - e0.y).abs() < 1e-6);
        assert!((send.x - e1.x).abs() < 1e-6 && (send.y - e1.y).abs() < 1e-6);
        assert!(!sub.is_cycle());
    }

    #[test]
    fn subpath_reversed_times() {
        let p = line_path();
        let sub = p.subpath(0.75, 0.25);
        let s0 = sub.point_of(0.0);
        #[allow(clippy::cast_precision_loss)]
        let s1 = sub.point_of(sub.path_length() as Scalar);
        let e0 = p.point_of(0.75);
        let e1 = p.point_of(0.25);
        assert!((s0.x - e0.x).abs() < 1e-6);
        assert!((s1.x - e1.x).abs() < 1e-6);
    }

    #[test]
    fn subpath_point_query() {
        let p = line_path();
        let sub = p.subpath(0.5, 0.5);
        assert_eq!(sub.knot_count(), 1);
        assert!((sub.point_of(0.0).x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn subpath_open_invariant() {
        let p = triangle_path();
        let sub = p.subpath(0.5, 2.0);
        let h = sub.head().unwrap();
        assert!(sub[h].left.is_endpoint());
        assert!(sub[sub.prev(h)].right.is_endpoint());
    }

    #[test]
    fn direction_time_on_line() {
        let p = line_path();
        assert_eq!(p.direction_time_of(1.0, 0.0), Some(0.0));
        assert_eq!(p.direction_time_of(-1.0, 0.0), None);
        assert_eq!(p.direction_time_of(0.0, 0.0), None);
    }

    #[test]
    fn direction_time_quarter_arc() {
        // A quarter-circle-ish arc from (1,0) up to (0,1): the tangent turns
        // from straight up to straight left, passing (-1,1) midway.
        let mut p = Path::new();
        let mut k0 = Knot::new(1.0, 0.0);
        k0.left = Side::Endpoint;
        k0.right = Side::Explicit { x: 1.0, y: 0.55 };
        p.append(k0);
        let mut k1 = Knot::new(0.0, 1.0);
        k1.left = Side::Explicit { x: 0.55, y: 1.0 };
        k1.right = Side::Endpoint;
        p.append(k1);

        let t = p.direction_time_of(-1.0, 1.0).expect("tangent hit");
        assert!((t - 0.5).abs() < 0.01, "t = {t}");
        assert!(p.direction_time_of(1.0, -1.0).is_none());
    }

    #[test]
    fn copy_compacts_and_preserves() {
        let p = triangle_path();
        let c = p.copy();
        assert_eq!(c.knot_count(), 3);
        for i in 0..12 {
            #[allow(clippy::cast_precision_loss)]
            let t = i as Scalar / 4.0;
            let a = p.point_of(t);
            let b = c.point_of(t);
            assert!((a.x - b.x).abs() < TOL && (a.y - b.y).abs() < TOL);
        }
    }

    #[test]
    fn display_mentions_cycle() {
        let p = triangle_path();
        let s = p.to_string();
        assert!(s.contains("cycle"));
        assert!(s.contains("controls"));
    }
}
