//! The Hobby–Knuth spline solver.
//!
//! Given a knot ring whose sides carry direction, curl and tension
//! constraints, [`Engine::make_choices`] computes the cubic Bezier control
//! points that realise the smooth interpolating spline:
//!
//! 1. collapse coincident knot pairs,
//! 2. detect fully open cycles and mark the head with an end-cycle sentinel,
//! 3. cut the ring into independent runs at knots whose incoming side is
//!    not open,
//! 4. per run, set up the turning angles (psi) and chord lengths,
//! 5. solve the tridiagonal system for the tangent angles (theta) and
//!    realise control points through the velocity function.
//!
//! The algorithm is described in J. D. Hobby, *Smooth, Easy to Compute
//! Interpolating Splines* (1986) and in chapter 14 of The METAFONTbook.
//! All arithmetic uses the fraction/angle scaling from [`crate::math`].

use log::trace;

use crate::error::Error;
use crate::math::{
    ab_vs_cd, curl_ratio, make_fraction, n_arg, negate, pyth_add, reduce_angle, sin_cos,
    take_fraction, velocity, FRACTION_HALF, FRACTION_ONE, FRACTION_THREE, UNITY,
};
use crate::path::{KnotId, Path};
use crate::types::{Scalar, Side};

/// The spline engine: scratch arrays for the tridiagonal solve, grown on
/// demand and reused across paths.
///
/// One engine serves one thread; paths may be handed to different engines
/// freely as long as each path is only being solved by one at a time.
#[derive(Debug, Clone)]
pub struct Engine {
    path_size: usize,
    delta_x: Vec<Scalar>,
    delta_y: Vec<Scalar>,
    delta: Vec<Scalar>,
    psi: Vec<Scalar>,
    theta: Vec<Scalar>,
    uu: Vec<Scalar>,
    vv: Vec<Scalar>,
    ww: Vec<Scalar>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        let mut e = Self {
            path_size: 0,
            delta_x: Vec::new(),
            delta_y: Vec::new(),
            delta: Vec::new(),
            psi: Vec::new(),
            theta: Vec::new(),
            uu: Vec::new(),
            vv: Vec::new(),
            ww: Vec::new(),
        };
        e.ensure_path_capacity(1000);
        e
    }

    /// Solve a path in place and, when it carries a polygonal pen, attach
    /// the swept envelope.
    ///
    /// Idempotent: a second pass sees explicit sides everywhere and leaves
    /// them alone.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPath`] when the path has no knots.
    pub fn solve(&mut self, path: &mut Path) -> Result<(), Error> {
        self.make_choices(path)?;
        crate::envelope::attach_envelope(path);
        Ok(())
    }

    /// Grow the scratch arrays to hold at least `size` entries.
    fn ensure_path_capacity(&mut self, size: usize) {
        if size <= self.path_size && size <= self.delta_x.len() {
            return;
        }
        let new_size = size.max(self.path_size + self.path_size / 4);
        for v in [
            &mut self.delta_x,
            &mut self.delta_y,
            &mut self.delta,
            &mut self.psi,
            &mut self.theta,
            &mut self.uu,
            &mut self.vv,
            &mut self.ww,
        ] {
            if v.len() < new_size {
                v.resize(new_size, 0.0);
            }
        }
        self.path_size = new_size;
    }

    /// Resolve every non-explicit side of `path` to explicit controls.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPath`] when the path has no knots.
    pub fn make_choices(&mut self, path: &mut Path) -> Result<(), Error> {
        let Some(knots) = path.head() else {
            return Err(Error::EmptyPath);
        };
        trace!("make_choices: {} knots", path.knot_count());

        // Coincident knot pairs collapse to explicit controls at the shared
        // anchor; an open neighbour side degrades to curl 1.
        let mut cur = knots;
        loop {
            let q = path.next(cur);
            if path[cur].x == path[q].x
                && path[cur].y == path[q].y
                && path[cur].right.needs_solving()
            {
                let (x, y) = (path[cur].x, path[cur].y);
                if let Side::Open { tension } = path[cur].left {
                    path[cur].left = Side::Curl {
                        curl: UNITY,
                        tension,
                    };
                }
                path[cur].right = Side::Explicit { x, y };
                if let Side::Open { tension } = path[q].right {
                    path[q].right = Side::Curl {
                        curl: UNITY,
                        tension,
                    };
                }
                path[q].left = Side::Explicit { x, y };
            }
            cur = q;
            if path[cur].right.is_endpoint() {
                break;
            }
            if cur == knots {
                break;
            }
        }

        // A walk that comes back to the head through open/open knots means
        // the whole ring is one cyclic run.
        let mut h = knots;
        loop {
            if !path[h].left.is_open() {
                break;
            }
            if !path[h].right.is_open() {
                break;
            }
            h = path.next(h);
            if path[h].right.is_endpoint() {
                break;
            }
            if h == knots {
                if let Side::Open { tension } = path[h].left {
                    path[h].left = Side::EndCycle { tension };
                }
                break;
            }
        }

        // Segmentation: each run [cur, q) ends at a knot whose left side is
        // not open. Open sides flanking a run boundary become curl or given
        // conditions derived from the adjacent explicit controls.
        cur = h;
        loop {
            let mut q = path.next(cur);
            if path[cur].right.needs_solving() {
                while path[q].left.is_open() && path[q].right.is_open() {
                    q = path.next(q);
                }

                if let Side::Open { tension } = path[q].left {
                    path[q].left = match path[q].right {
                        Side::Curl { curl, .. } => Side::Curl { curl, tension },
                        Side::Explicit { x, y } => {
                            let delx = x - path[q].x;
                            let dely = y - path[q].y;
                            if delx == 0.0 && dely == 0.0 {
                                Side::Curl {
                                    curl: UNITY,
                                    tension,
                                }
                            } else {
                                Side::Given {
                                    angle: n_arg(delx, dely),
                                    tension,
                                }
                            }
                        }
                        _ => Side::Curl {
                            curl: UNITY,
                            tension,
                        },
                    };
                }
                if let (Side::Open { tension }, Side::Explicit { x: lx, y: ly }) =
                    (path[cur].right, path[cur].left)
                {
                    let delx = path[cur].x - lx;
                    let dely = path[cur].y - ly;
                    path[cur].right = if delx == 0.0 && dely == 0.0 {
                        Side::Curl {
                            curl: UNITY,
                            tension,
                        }
                    } else {
                        Side::Given {
                            angle: n_arg(delx, dely),
                            tension,
                        }
                    };
                }

                let n = self.compute_psi_theta(path, cur, q);
                self.solve_choices(path, cur, n);
            }
            // An endpoint right side terminates the path; its controls read
            // as the anchor already.
            cur = q;
            if path[cur].right.is_endpoint() {
                break;
            }
            if cur == h {
                break;
            }
        }
        Ok(())
    }

    /// Fill the chord (`delta`) and turning-angle (`psi`) arrays for the run
    /// `[start, stop)`. Returns the number of segments `n`; for a cyclic run
    /// the arrays carry one extra wrap-around slot and `psi[n+1] = psi[1]`.
    fn compute_psi_theta(&mut self, path: &Path, start: KnotId, stop: KnotId) -> usize {
        let mut k = 0usize;
        let mut s = start;
        let mut n = usize::MAX;
        loop {
            if k + 1 >= self.delta_x.len() {
                self.ensure_path_capacity(k + k / 4 + 2);
            }
            let t = path.next(s);
            self.delta_x[k] = path[t].x - path[s].x;
            self.delta_y[k] = path[t].y - path[s].y;
            self.delta[k] = pyth_add(self.delta_x[k], self.delta_y[k]);
            if k > 0 {
                let sine = make_fraction(self.delta_y[k - 1], self.delta[k - 1]);
                let cosine = make_fraction(self.delta_x[k - 1], self.delta[k - 1]);
                let arg1 = take_fraction(self.delta_x[k], cosine)
                    + take_fraction(self.delta_y[k], sine);
                let arg2 = take_fraction(self.delta_y[k], cosine)
                    - take_fraction(self.delta_x[k], sine);
                self.psi[k] = n_arg(arg1, arg2);
            }
            k += 1;
            s = t;
            if s == stop {
                n = k;
            }
            if k >= n && !matches!(path[s].left, Side::EndCycle { .. }) {
                break;
            }
        }
        if k >= self.psi.len() {
            self.ensure_path_capacity(k + 1);
        }
        self.psi[k] = if k == n { 0.0 } else { self.psi[1] };
        n
    }

    /// Solve the tridiagonal system for the `n`-segment run starting at `p`
    /// and write explicit controls.
    fn solve_choices(&mut self, path: &mut Path, p: KnotId, n: usize) {
        if n == 0 {
            return;
        }
        let mut t = path.next(p);
        self.delta_x[0] = path[t].x - path[p].x;
        self.delta_y[0] = path[t].y - path[p].y;

        let mut r = p; // predecessor of s; only read once k > 0
        let mut s = p;
        let mut k = 0usize;
        let mut found = false;
        while !found {
            t = path.next(s);
            if k == 0 {
                match path[s].right {
                    Side::Given { angle: s_angle, .. } => {
                        if let Side::Given { angle: t_angle, .. } = path[t].left {
                            // Both directions prescribed: realise directly.
                            let narg = n_arg(self.delta_x[0], self.delta_y[0]);
                            let (ct, st) = sin_cos(s_angle - narg);
                            let (cf, sf) = sin_cos(t_angle - narg);
                            let sf = negate(sf);
                            self.set_controls(path, s, t, 0, st, ct, sf, cf);
                            return;
                        }
                        let narg = n_arg(self.delta_x[0], self.delta_y[0]);
                        self.vv[0] = reduce_angle(s_angle - narg);
                        self.uu[0] = 0.0;
                        self.ww[0] = 0.0;
                    }
                    Side::Curl {
                        curl: cc,
                        tension: rt_raw,
                    } => {
                        let rt = rt_raw.abs();
                        let lt = path[t].left.tension().abs();
                        if let Side::Curl { .. } = path[t].left {
                            // Curl at both ends of a lone segment: place the
                            // controls a third of the way, adjusted for
                            // tension.
                            let (prx, pry) = if rt == UNITY {
                                (
                                    path[s].x + self.delta_x[0] / 3.0,
                                    path[s].y + self.delta_y[0] / 3.0,
                                )
                            } else {
                                let ff = make_fraction(UNITY, 3.0 * rt);
                                (
                                    path[s].x + take_fraction(self.delta_x[0], ff),
                                    path[s].y + take_fraction(self.delta_y[0], ff),
                                )
                            };
                            let (tlx, tly) = if lt == UNITY {
                                (
                                    path[t].x - self.delta_x[0] / 3.0,
                                    path[t].y - self.delta_y[0] / 3.0,
                                )
                            } else {
                                let ff = make_fraction(UNITY, 3.0 * lt);
                                (
                                    path[t].x - take_fraction(self.delta_x[0], ff),
                                    path[t].y - take_fraction(self.delta_y[0], ff),
                                )
                            };
                            path[s].right = Side::Explicit { x: prx, y: pry };
                            path[t].left = Side::Explicit { x: tlx, y: tly };
                            return;
                        }
                        if rt == UNITY && lt == UNITY {
                            if cc.is_infinite() || cc > f64::MAX / 4.0 {
                                // limit of (2c+1)/(c+2) as c goes to infinity
                                self.uu[0] = 2.0;
                            } else {
                                self.uu[0] = make_fraction(2.0 * cc + UNITY, cc + 2.0);
                            }
                        } else {
                            self.uu[0] = curl_ratio(cc, rt, lt);
                        }
                        self.vv[0] = negate(take_fraction(self.psi[1], self.uu[0]));
                        self.ww[0] = 0.0;
                    }
                    _ => {
                        self.uu[0] = 0.0;
                        self.vv[0] = 0.0;
                        self.ww[0] = FRACTION_ONE;
                    }
                }
            } else {
                match path[s].left {
                    Side::EndCycle { .. } | Side::Open { .. } => {
                        self.delta_x[k] = path[t].x - path[s].x;
                        self.delta_y[k] = path[t].y - path[s].y;
                        self.delta[k] = pyth_add(self.delta_x[k], self.delta_y[k]);

                        let mut aa = FRACTION_HALF;
                        let mut bb = FRACTION_HALF;
                        let mut dd = 2.0 * self.delta[k];
                        let mut ee = 2.0 * self.delta[k - 1];

                        let rt_prev = path[r].right.tension().abs();
                        let lt_next = path[t].left.tension().abs();
                        if rt_prev != UNITY {
                            aa = make_fraction(UNITY, 3.0 * rt_prev - UNITY);
                            let ret = make_fraction(UNITY, rt_prev);
                            dd = take_fraction(self.delta[k], FRACTION_THREE - ret);
                        }
                        if lt_next != UNITY {
                            bb = make_fraction(UNITY, 3.0 * lt_next - UNITY);
                            let ret = make_fraction(UNITY, lt_next);
                            ee = take_fraction(self.delta[k - 1], FRACTION_THREE - ret);
                        }
                        let cc = FRACTION_ONE - take_fraction(self.uu[k - 1], aa);
                        dd = take_fraction(dd, cc);

                        // Unequal tensions around s skew the chord weights.
                        let lt_s = path[s].left.tension().abs();
                        let rt_s = path[s].right.tension().abs();
                        if lt_s != rt_s {
                            if lt_s < rt_s {
                                let r1 = make_fraction(lt_s, rt_s);
                                let ff = take_fraction(r1, r1);
                                dd = take_fraction(dd, ff);
                            } else {
                                let r1 = make_fraction(rt_s, lt_s);
                                let ff = take_fraction(r1, r1);
                                ee = take_fraction(ee, ff);
                            }
                        }

                        let mut ff = make_fraction(ee, dd + ee);
                        self.uu[k] = take_fraction(ff, bb);

                        let mut acc = negate(take_fraction(self.psi[k + 1], self.uu[k]));
                        if matches!(path[r].right, Side::Curl { .. }) {
                            self.ww[k] = 0.0;
                            self.vv[k] = acc - take_fraction(self.psi[1], FRACTION_ONE - ff);
                        } else {
                            ff = make_fraction(FRACTION_ONE - ff, cc);
                            acc -= take_fraction(self.psi[k], ff);
                            ff = take_fraction(ff, aa);
                            self.vv[k] = acc - take_fraction(self.vv[k - 1], ff);
                            if self.ww[k - 1] == 0.0 {
                                self.ww[k] = 0.0;
                            } else {
                                self.ww[k] = negate(take_fraction(self.ww[k - 1], ff));
                            }
                        }

                        if matches!(path[s].left, Side::EndCycle { .. }) {
                            // Close the cycle: eliminate back through the
                            // ring to pin theta[n], then fold it into vv.
                            let mut aa = 0.0;
                            let mut bb = FRACTION_ONE;
                            let mut kk = k;
                            loop {
                                kk -= 1;
                                if kk == 0 {
                                    kk = n;
                                }
                                aa = self.vv[kk] - take_fraction(aa, self.uu[kk]);
                                bb = self.ww[kk] - take_fraction(bb, self.uu[kk]);
                                if kk == n {
                                    break;
                                }
                            }
                            let r1 = make_fraction(aa, FRACTION_ONE - bb);
                            self.theta[n] = r1;
                            self.vv[0] = r1;
                            for kk in 1..n {
                                self.vv[kk] += take_fraction(r1, self.ww[kk]);
                            }
                            found = true;
                        }
                    }
                    Side::Curl {
                        curl: cc,
                        tension: lt_raw,
                    } => {
                        let lt = lt_raw.abs();
                        let rt = path[r].right.tension().abs();
                        let ff = if rt == UNITY && lt == UNITY {
                            make_fraction(2.0 * cc + UNITY, cc + 2.0)
                        } else {
                            curl_ratio(cc, lt, rt)
                        };
                        let arg1 = take_fraction(self.vv[n - 1], ff);
                        let arg2 = FRACTION_ONE - take_fraction(ff, self.uu[n - 1]);
                        self.theta[n] = negate(make_fraction(arg1, arg2));
                        found = true;
                    }
                    Side::Given { angle, .. } => {
                        let narg = n_arg(self.delta_x[n - 1], self.delta_y[n - 1]);
                        self.theta[n] = reduce_angle(angle - narg);
                        found = true;
                    }
                    Side::Endpoint | Side::Explicit { .. } => {}
                }
            }
            if found {
                break;
            }
            r = s;
            s = t;
            k += 1;
        }

        // Back-substitution.
        for k in (0..n).rev() {
            self.theta[k] = self.vv[k] - take_fraction(self.theta[k + 1], self.uu[k]);
        }

        // Control realisation from the solved angles.
        let mut s = p;
        for k in 0..n {
            let t = path.next(s);
            let (ct, st) = sin_cos(self.theta[k]);
            let (cf, sf) = sin_cos(negate(self.psi[k + 1] + self.theta[k + 1]));
            self.set_controls(path, s, t, k, st, ct, sf, cf);
            s = t;
        }
    }

    /// Write the controls of segment `k` between `p` and `q` from the solved
    /// angles, applying the negative-tension ("at least") correction.
    fn set_controls(
        &mut self,
        path: &mut Path,
        p: KnotId,
        q: KnotId,
        k: usize,
        st: Scalar,
        ct: Scalar,
        sf: Scalar,
        cf: Scalar,
    ) {
        let lt_raw = path[q].left.tension();
        let rt_raw = path[p].right.tension();
        let lt = lt_raw.abs();
        let rt = rt_raw.abs();
        let mut rr = velocity(st, ct, sf, cf, rt);
        let mut ss = velocity(sf, cf, st, ct, lt);

        if (rt_raw < 0.0 || lt_raw < 0.0)
            && ((st >= 0.0 && sf >= 0.0) || (st <= 0.0 && sf <= 0.0))
        {
            // "At least" tension: keep the control inside the bounding
            // triangle when both angles bend the same way.
            let sine = take_fraction(st.abs(), cf) + take_fraction(sf.abs(), ct);
            if sine > 0.0 {
                if rt_raw < 0.0 && ab_vs_cd(sf.abs(), FRACTION_ONE, rr, sine) < 0.0 {
                    rr = make_fraction(sf.abs(), sine);
                }
                if lt_raw < 0.0 && ab_vs_cd(st.abs(), FRACTION_ONE, ss, sine) < 0.0 {
                    ss = make_fraction(st.abs(), sine);
                }
            }
        }

        let r1 = take_fraction(self.delta_x[k], ct);
        let r2 = take_fraction(self.delta_y[k], st);
        let prx = path[p].x + take_fraction(r1 - r2, rr);
        let r1 = take_fraction(self.delta_y[k], ct);
        let r2 = take_fraction(self.delta_x[k], st);
        let pry = path[p].y + take_fraction(r1 + r2, rr);

        let r1 = take_fraction(self.delta_x[k], cf);
        let r2 = take_fraction(self.delta_y[k], sf);
        let qlx = path[q].x - take_fraction(r1 + r2, ss);
        let r1 = take_fraction(self.delta_y[k], cf);
        let r2 = take_fraction(self.delta_x[k], sf);
        let qly = path[q].y - take_fraction(r1 - r2, ss);

        path[p].right = Side::Explicit { x: prx, y: pry };
        path[q].left = Side::Explicit { x: qlx, y: qly };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
