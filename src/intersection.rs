//! Path intersection by recursive bisection, and the operations built on
//! it: `cut_before`, `cut_after` and `build_cycle`.
//!
//! Segment pairs are rejected by axis-aligned bounding boxes; surviving
//! pairs are bisected (always the larger curve) until both boxes shrink
//! below a tolerance. The first accepted intersection wins. Two sweeps run
//! over all segment pairs: a strict one, then one with a slack bounding-box
//! tolerance that catches near-miss touching cases.
//!
//! Recursion depth is capped, and so is the total number of box probes per
//! query, which bounds worst-case cost on pathological near-parallel
//! curves.

use crate::bezier::CubicSegment;
use crate::path::{KnotId, Path};
use crate::types::{Knot, Point, Scalar, Side};

/// Maximum bisection depth per segment pair.
const MAX_DEPTH: u32 = 20;

/// Total box-probe budget per intersection query.
const MAX_PATIENCE: u32 = 5000;

/// Boxes this small count as an intersection.
const TOLERANCE: Scalar = 1e-4;

impl Path {
    /// Times of the first intersection of `self` with `other`, or
    /// `(-1, -1)` when the paths do not meet.
    #[must_use]
    pub fn intersection_times(&self, other: &Self) -> (Scalar, Scalar) {
        let np = self.path_length();
        let nq = other.path_length();
        if np == 0 || nq == 0 {
            return (-1.0, -1.0);
        }

        let mut patience = MAX_PATIENCE;
        for tol_step in [0.0, 3.0] {
            for i in 0..np {
                let Some(ki) = self.segment_start(i) else {
                    continue;
                };
                let seg1 = CubicSegment::from_ring(self, ki);
                for j in 0..nq {
                    let Some(kj) = other.segment_start(j) else {
                        continue;
                    };
                    let seg2 = CubicSegment::from_ring(other, kj);
                    if let Some((t1, t2)) =
                        cubic_intersection(&seg1, &seg2, tol_step, &mut patience)
                    {
                        #[allow(clippy::cast_precision_loss)]
                        return (i as Scalar + t1, j as Scalar + t2);
                    }
                }
            }
        }
        (-1.0, -1.0)
    }

    /// The first intersection point, or `None`.
    #[must_use]
    pub fn intersection_point(&self, other: &Self) -> Option<Point> {
        let (t1, _) = self.intersection_times(other);
        if t1 < 0.0 {
            None
        } else {
            Some(self.point_of(t1))
        }
    }

    /// The part of `self` from its first intersection with `other` to the
    /// end. Without an intersection the whole path is returned.
    #[must_use]
    pub fn cut_before(&self, other: &Self) -> Self {
        if self.head().is_none() {
            return Self::new();
        }
        if other.head().is_none() {
            return self.copy();
        }
        let (t1, _) = self.intersection_times(other);
        if t1 < 0.0 {
            return self.copy();
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.path_length() as Scalar;
        self.subpath(t1, n)
    }

    /// The part of `self` from the start to its first intersection with
    /// `other`. Without an intersection the whole path is returned.
    #[must_use]
    pub fn cut_after(&self, other: &Self) -> Self {
        if self.head().is_none() {
            return Self::new();
        }
        if other.head().is_none() {
            return self.copy();
        }
        let (t1, _) = self.intersection_times(other);
        if t1 < 0.0 {
            return self.copy();
        }
        self.subpath(0.0, t1)
    }
}

/// Find one intersection of two cubics. `tol` loosens the initial box
/// rejection; `patience` is the shared probe budget.
fn cubic_intersection(
    p: &CubicSegment,
    q: &CubicSegment,
    tol: Scalar,
    patience: &mut u32,
) -> Option<(Scalar, Scalar)> {
    let (pmin, pmax) = p.hull_bbox();
    let (qmin, qmax) = q.hull_bbox();
    if pmax.x + tol < qmin.x
        || qmax.x + tol < pmin.x
        || pmax.y + tol < qmin.y
        || qmax.y + tol < pmin.y
    {
        return None;
    }
    cubic_intersection_recursive(p, 0.0, 1.0, q, 0.0, 1.0, MAX_DEPTH, patience)
}

fn cubic_intersection_recursive(
    p: &CubicSegment,
    pt0: Scalar,
    pt1: Scalar,
    q: &CubicSegment,
    qt0: Scalar,
    qt1: Scalar,
    depth: u32,
    patience: &mut u32,
) -> Option<(Scalar, Scalar)> {
    let (pmin, pmax) = p.hull_bbox();
    let (qmin, qmax) = q.hull_bbox();
    if pmax.x < qmin.x || qmax.x < pmin.x || pmax.y < qmin.y || qmax.y < pmin.y {
        return None;
    }

    let p_mid = (pt0 + pt1) / 2.0;
    let q_mid = (qt0 + qt1) / 2.0;

    // Overlapping boxes from here on; when the budget runs dry, the current
    // midpoints are as good an answer as the depth cap would give.
    if *patience == 0 {
        return Some((p_mid, q_mid));
    }
    *patience -= 1;

    let p_size = (pmax.x - pmin.x).max(pmax.y - pmin.y);
    let q_size = (qmax.x - qmin.x).max(qmax.y - qmin.y);
    if (p_size <= TOLERANCE && q_size <= TOLERANCE) || depth == 0 {
        return Some((p_mid, q_mid));
    }

    if p_size >= q_size {
        let (left, right) = p.split(0.5);
        cubic_intersection_recursive(&left, pt0, p_mid, q, qt0, qt1, depth - 1, patience).or_else(
            || cubic_intersection_recursive(&right, p_mid, pt1, q, qt0, qt1, depth - 1, patience),
        )
    } else {
        let (left, right) = q.split(0.5);
        cubic_intersection_recursive(p, pt0, pt1, &left, qt0, q_mid, depth - 1, patience).or_else(
            || cubic_intersection_recursive(p, pt0, pt1, &right, q_mid, qt1, depth - 1, patience),
        )
    }
}

// ---------------------------------------------------------------------------
// Build cycle
// ---------------------------------------------------------------------------

/// A knot copy with both sides pinned to explicit controls.
fn explicit_knot(k: &Knot) -> Knot {
    let (lx, ly) = k.left_control();
    let (rx, ry) = k.right_control();
    let mut out = Knot::new(k.x, k.y);
    out.left = Side::Explicit { x: lx, y: ly };
    out.right = Side::Explicit { x: rx, y: ry };
    out
}

/// Join `n >= 2` paths into a closed cycle through their pairwise
/// intersections.
///
/// For each path the entry time is its intersection with the reversed
/// predecessor (converted back to forward time); the subpaths between entry
/// and exit times are concatenated and the joints' controls pinned so the
/// seams stay put without re-solving. Returns `None` when any consecutive
/// pair fails to intersect.
#[must_use]
pub fn build_cycle(paths: &[&Path]) -> Option<Path> {
    let n = paths.len();
    if n < 2 {
        return None;
    }

    let mut ta = vec![0.0; n];
    let mut tb = vec![0.0; n];
    let mut prev_idx = n - 1;
    for i in 0..n {
        let reversed_prev = paths[prev_idx].reverse();
        let (t1, t2) = paths[i].intersection_times(&reversed_prev);
        if t1 < 0.0 {
            return None;
        }
        ta[i] = t1;
        #[allow(clippy::cast_precision_loss)]
        let prev_len = paths[prev_idx].path_length() as Scalar;
        tb[prev_idx] = prev_len - t2;
        prev_idx = i;
    }

    let mut result = Path::new();
    for i in 0..n {
        let sub = paths[i].subpath(ta[i], tb[i]);
        let Some(sub_head) = sub.head() else {
            continue;
        };

        if result.head().is_none() {
            for id in sub.ring_ids() {
                result.append(explicit_knot(&sub[id]));
            }
        } else {
            // The first knot of this subpath coincides with the running
            // tail; keep the tail but adopt the outgoing control.
            let tail = KnotId(result.knots.len() - 1);
            let (rx, ry) = sub[sub_head].right_control();
            result[tail].right = Side::Explicit { x: rx, y: ry };

            let is_last = i == n - 1;
            let mut cur = sub.next(sub_head);
            while cur != sub_head {
                result.append(explicit_knot(&sub[cur]));
                cur = sub.next(cur);
                if is_last && sub[cur].right.is_endpoint() {
                    break;
                }
            }
        }
    }

    let first = result.head()?;
    let last = result.prev(first);

    // Close the seam between the last subpath's end and the cycle start.
    let sub = paths[n - 1].subpath(ta[n - 1], tb[n - 1]);
    if let Some(sub_head) = sub.head() {
        let mut endpoint = sub_head;
        loop {
            let nx = sub.next(endpoint);
            if nx == sub_head {
                break;
            }
            endpoint = nx;
            if sub[endpoint].right.is_endpoint() {
                break;
            }
        }
        let (rx, ry) = sub[endpoint].right_control();
        result[last].right = Side::Explicit { x: rx, y: ry };
    }
    let sub0 = paths[0].subpath(ta[0], tb[0]);
    if let Some(h0) = sub0.head() {
        let (lx, ly) = sub0[h0].left_control();
        result[first].left = Side::Explicit { x: lx, y: ly };
    }

    Some(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
