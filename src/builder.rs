//! Fluent path construction.
//!
//! [`PathBuilder`] buffers per-segment options (directions, tensions,
//! curls, explicit controls) and encodes them as knot boundary conditions
//! when the path is built:
//!
//! ```
//! use metacurve::{Engine, PathBuilder, Point};
//!
//! let mut engine = Engine::new();
//! let path = PathBuilder::new()
//!     .move_to(Point::new(0.0, 0.0))
//!     .out_direction(45.0)
//!     .in_direction(-30.0)
//!     .curve_to(Point::new(100.0, 0.0))
//!     .solve(&mut engine)
//!     .unwrap();
//! assert_eq!(path.path_length(), 1);
//! ```
//!
//! `line_to` is the `--` connector: curl 1 on both sides of the segment.
//! `close` makes the path cyclic, inheriting the currently buffered
//! direction/curl as the closing boundary condition. A direction or curl
//! buffered after the final `curve_to` of an open path becomes the
//! terminal incoming condition.

use std::sync::Arc;

use crate::error::Error;
use crate::math::{ANGLE_MULTIPLIER, INFINITY};
use crate::path::hobby::Engine;
use crate::path::Path;
use crate::pen::Pen;
use crate::transform::Transform;
use crate::types::{Color, DashPattern, Knot, LineCap, LineJoin, Point, Scalar, Side, Style};

/// Degrees to `MetaPost`-scaled degrees.
fn deg_to_angle(d: Scalar) -> Scalar {
    d * ANGLE_MULTIPLIER
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    to: Point,
    out_dir: Scalar,
    in_dir: Scalar,
    out_set: bool,
    in_set: bool,
    line: bool,
    out_tension: Scalar,
    in_tension: Scalar,
    out_t_set: bool,
    in_t_set: bool,
    out_curl: Scalar,
    in_curl: Scalar,
    out_curl_set: bool,
    in_curl_set: bool,
    explicit: bool,
    ctrl1: Point,
    ctrl2: Point,
}

/// Builder for [`Path`] values.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    start: Option<Point>,
    out_dir: Scalar,
    in_dir: Scalar,
    out_tension: Scalar,
    in_tension: Scalar,
    out_curl: Scalar,
    in_curl: Scalar,
    out_set: bool,
    in_set: bool,
    out_t_set: bool,
    in_t_set: bool,
    out_curl_set: bool,
    in_curl_set: bool,
    segments: Vec<Segment>,
    closed: bool,
    close_out: Scalar,
    close_in: Scalar,
    close_out_set: bool,
    close_in_set: bool,
    close_out_curl: Scalar,
    close_in_curl: Scalar,
    close_out_curl_set: bool,
    close_in_curl_set: bool,
    style: Style,
    transforms: Vec<Transform>,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            out_dir: 0.0,
            in_dir: 0.0,
            out_tension: 1.0,
            in_tension: 1.0,
            out_curl: 0.0,
            in_curl: 0.0,
            out_set: false,
            in_set: false,
            out_t_set: false,
            in_t_set: false,
            out_curl_set: false,
            in_curl_set: false,
            segments: Vec::new(),
            closed: false,
            close_out: 0.0,
            close_in: 0.0,
            close_out_set: false,
            close_in_set: false,
            close_out_curl: 0.0,
            close_in_curl: 0.0,
            close_out_curl_set: false,
            close_in_curl_set: false,
            style: Style::default(),
            transforms: Vec::new(),
        }
    }

    /// Set the starting point.
    #[must_use]
    pub fn move_to(mut self, p: Point) -> Self {
        self.start = Some(p);
        self
    }

    /// Outgoing direction in degrees for the next segment.
    #[must_use]
    pub fn out_direction(mut self, deg: Scalar) -> Self {
        self.out_dir = deg;
        self.out_set = true;
        self
    }

    /// Incoming direction in degrees for the next segment.
    #[must_use]
    pub fn in_direction(mut self, deg: Scalar) -> Self {
        self.in_dir = deg;
        self.in_set = true;
        self
    }

    /// Curl on both ends of the next segment.
    #[must_use]
    pub fn curl(self, c: Scalar) -> Self {
        self.out_curl(c).in_curl(c)
    }

    /// Curl on the outgoing end of the next segment.
    #[must_use]
    pub fn out_curl(mut self, c: Scalar) -> Self {
        self.out_curl = c;
        self.out_curl_set = true;
        self
    }

    /// Curl on the incoming end of the next segment.
    #[must_use]
    pub fn in_curl(mut self, c: Scalar) -> Self {
        self.in_curl = c;
        self.in_curl_set = true;
        self
    }

    /// Tension on both ends of the next segment.
    #[must_use]
    pub fn tension(mut self, t: Scalar) -> Self {
        self.out_tension = t;
        self.in_tension = t;
        self.out_t_set = true;
        self.in_t_set = true;
        self
    }

    /// `tension atleast t` on both ends (the `...` connector when `t` is 1).
    ///
    /// Stored negated; the solver reads the sign as the "at least" flag.
    #[must_use]
    pub fn tension_atleast(mut self, t: Scalar) -> Self {
        self.out_tension = -t;
        self.in_tension = -t;
        self.out_t_set = true;
        self.in_t_set = true;
        self
    }

    /// `tension infinity`: effectively a straight connector.
    #[must_use]
    pub fn tension_infinity(mut self) -> Self {
        self.out_tension = INFINITY;
        self.in_tension = INFINITY;
        self.out_t_set = true;
        self.in_t_set = true;
        self
    }

    /// Tension on the outgoing end only.
    #[must_use]
    pub fn out_tension(mut self, t: Scalar) -> Self {
        self.out_tension = t;
        self.out_t_set = true;
        self
    }

    /// Tension on the incoming end only.
    #[must_use]
    pub fn in_tension(mut self, t: Scalar) -> Self {
        self.in_tension = t;
        self.in_t_set = true;
        self
    }

    // -----------------------------------------------------------------------
    // Style
    // -----------------------------------------------------------------------

    /// Stroke colour.
    #[must_use]
    pub fn stroke(mut self, c: Color) -> Self {
        self.style.stroke = Some(c);
        self
    }

    /// Stroke width (used by backends for elliptical pens).
    #[must_use]
    pub fn stroke_width(mut self, w: Scalar) -> Self {
        self.style.stroke_width = w;
        self
    }

    /// Fill colour.
    #[must_use]
    pub fn fill(mut self, c: Color) -> Self {
        self.style.fill = Some(c);
        self
    }

    /// Attach a pen. Polygonal pens get an envelope at solve time.
    #[must_use]
    pub fn pen(mut self, pen: Arc<Pen>) -> Self {
        self.style.pen = Some(pen);
        self
    }

    #[must_use]
    pub fn line_join(mut self, join: LineJoin) -> Self {
        self.style.line_join = join;
        self
    }

    #[must_use]
    pub fn line_cap(mut self, cap: LineCap) -> Self {
        self.style.line_cap = cap;
        self
    }

    #[must_use]
    pub fn miter_limit(mut self, limit: Scalar) -> Self {
        self.style.miter_limit = limit;
        self
    }

    /// Dash with alternating on/off lengths.
    #[must_use]
    pub fn dashed(mut self, on_off: &[Scalar]) -> Self {
        self.style.dash = DashPattern::new(on_off);
        self
    }

    /// Use a prepared dash pattern.
    #[must_use]
    pub fn dash_pattern(mut self, d: DashPattern) -> Self {
        self.style.dash = Some(d);
        self
    }

    /// Arrowhead at the end.
    #[must_use]
    pub fn arrow(mut self) -> Self {
        self.style.arrow.end = true;
        self
    }

    /// Arrowheads at both ends.
    #[must_use]
    pub fn double_arrow(mut self) -> Self {
        self.style.arrow.start = true;
        self.style.arrow.end = true;
        self
    }

    /// Custom arrowhead dimensions.
    #[must_use]
    pub fn arrow_style(mut self, length: Scalar, angle: Scalar) -> Self {
        self.style.arrow.length = length;
        self.style.arrow.angle = angle;
        self
    }

    // -----------------------------------------------------------------------
    // Post-solve transforms
    // -----------------------------------------------------------------------

    /// Queue an arbitrary transform, applied after solving.
    #[must_use]
    pub fn transformed(mut self, t: Transform) -> Self {
        self.transforms.push(t);
        self
    }

    #[must_use]
    pub fn shifted(self, dx: Scalar, dy: Scalar) -> Self {
        self.transformed(Transform::shifted(dx, dy))
    }

    #[must_use]
    pub fn scaled(self, s: Scalar) -> Self {
        self.transformed(Transform::scaled(s))
    }

    #[must_use]
    pub fn rotated(self, angle_deg: Scalar) -> Self {
        self.transformed(Transform::rotated(angle_deg))
    }

    // -----------------------------------------------------------------------
    // Segments
    // -----------------------------------------------------------------------

    fn push_segment(&mut self, to: Point, line: bool, explicit: Option<(Point, Point)>) {
        let (ctrl1, ctrl2) = explicit.unwrap_or((Point::ZERO, Point::ZERO));
        self.segments.push(Segment {
            to,
            out_dir: self.out_dir,
            in_dir: self.in_dir,
            out_set: self.out_set,
            in_set: self.in_set,
            line,
            out_tension: self.out_tension,
            in_tension: self.in_tension,
            out_t_set: self.out_t_set,
            in_t_set: self.in_t_set,
            out_curl: self.out_curl,
            in_curl: self.in_curl,
            out_curl_set: self.out_curl_set,
            in_curl_set: self.in_curl_set,
            explicit: explicit.is_some(),
            ctrl1,
            ctrl2,
        });
        self.reset_after_segment();
    }

    fn reset_after_segment(&mut self) {
        self.out_set = false;
        self.in_set = false;
        self.out_t_set = false;
        self.in_t_set = false;
        self.out_tension = 1.0;
        self.in_tension = 1.0;
        self.out_curl_set = false;
        self.in_curl_set = false;
        self.out_curl = 0.0;
        self.in_curl = 0.0;
    }

    /// A curved segment to `pt` using the buffered options (`..`).
    #[must_use]
    pub fn curve_to(mut self, pt: Point) -> Self {
        self.push_segment(pt, false, None);
        self
    }

    /// A curved segment with both directions given inline.
    #[must_use]
    pub fn curve_to_dir(self, pt: Point, out_deg: Scalar, in_deg: Scalar) -> Self {
        self.out_direction(out_deg).in_direction(in_deg).curve_to(pt)
    }

    /// A segment with explicit control points (skips solving).
    #[must_use]
    pub fn curve_to_with_controls(mut self, pt: Point, c1: Point, c2: Point) -> Self {
        self.push_segment(pt, false, Some((c1, c2)));
        self
    }

    /// A straight segment (`--`): curl 1 on both sides.
    #[must_use]
    pub fn line_to(mut self, pt: Point) -> Self {
        self.push_segment(pt, true, None);
        self
    }

    /// Close the path into a cycle, inheriting the currently buffered
    /// direction or curl as the closing boundary condition.
    #[must_use]
    pub fn close(mut self) -> Self {
        self.closed = true;
        self.close_out = self.out_dir;
        self.close_in = self.in_dir;
        self.close_out_set = self.out_set;
        self.close_in_set = self.in_set;
        self.close_out_curl = self.out_curl;
        self.close_in_curl = self.in_curl;
        self.close_out_curl_set = self.out_curl_set;
        self.close_in_curl_set = self.in_curl_set;
        self
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Encode the buffered description as a knot ring. The path still needs
    /// [`Engine::solve`] unless every segment carried explicit controls.
    #[must_use]
    pub fn build(&self) -> Path {
        let Some(start_pt) = self.start else {
            return Path::new();
        };
        if self.segments.is_empty() {
            return Path::new();
        }

        let mut path = Path::new();
        path.style = self.style.clone();

        let first = &self.segments[0];
        let last_seg = &self.segments[self.segments.len() - 1];

        // Start knot. The incoming tension of a closing path is the final
        // segment's; the outgoing tension is the first segment's.
        let left_tension = if self.closed && last_seg.in_t_set {
            last_seg.in_tension
        } else {
            1.0
        };
        let right_tension = if first.out_t_set { first.out_tension } else { 1.0 };

        let mut start = Knot::new(start_pt.x, start_pt.y);
        start.left = if self.closed {
            if self.close_in_set {
                Side::Given {
                    angle: deg_to_angle(self.close_in),
                    tension: left_tension,
                }
            } else if self.close_in_curl_set {
                Side::Curl {
                    curl: self.close_in_curl,
                    tension: left_tension,
                }
            } else if last_seg.line {
                Side::Curl {
                    curl: 1.0,
                    tension: left_tension,
                }
            } else {
                Side::Open {
                    tension: left_tension,
                }
            }
        } else {
            Side::Endpoint
        };
        start.right = if first.explicit {
            Side::explicit(first.ctrl1)
        } else if first.out_curl_set {
            Side::Curl {
                curl: first.out_curl,
                tension: right_tension,
            }
        } else if first.line {
            Side::Curl {
                curl: 1.0,
                tension: right_tension,
            }
        } else if first.out_set {
            Side::Given {
                angle: deg_to_angle(first.out_dir),
                tension: right_tension,
            }
        } else if !self.closed || last_seg.line {
            // Open paths default to curl 1, and so does a cycle closed by a
            // straight connector.
            Side::Curl {
                curl: 1.0,
                tension: right_tension,
            }
        } else {
            Side::Open {
                tension: right_tension,
            }
        };
        path.append(start);

        // One end knot per segment.
        for (i, seg) in self.segments.iter().enumerate() {
            let is_last = i == self.segments.len() - 1;
            let mut end = Knot::new(seg.to.x, seg.to.y);

            let in_tension = if seg.in_t_set { seg.in_tension } else { 1.0 };
            end.left = if seg.explicit {
                Side::explicit(seg.ctrl2)
            } else if seg.in_curl_set {
                Side::Curl {
                    curl: seg.in_curl,
                    tension: in_tension,
                }
            } else if seg.line {
                Side::Curl {
                    curl: 1.0,
                    tension: in_tension,
                }
            } else if seg.in_set {
                Side::Given {
                    angle: deg_to_angle(seg.in_dir),
                    tension: in_tension,
                }
            } else if !is_last {
                // The next segment's outgoing condition doubles as this
                // knot's incoming one: a direction at a point binds both
                // sides.
                let next = &self.segments[i + 1];
                if next.line {
                    Side::Curl {
                        curl: 1.0,
                        tension: in_tension,
                    }
                } else if next.out_curl_set {
                    Side::Curl {
                        curl: next.out_curl,
                        tension: in_tension,
                    }
                } else if next.out_set {
                    Side::Given {
                        angle: deg_to_angle(next.out_dir),
                        tension: in_tension,
                    }
                } else {
                    Side::Open {
                        tension: in_tension,
                    }
                }
            } else if !self.closed {
                // A direction or curl buffered after the last segment acts
                // as the terminal incoming condition.
                if self.in_set {
                    Side::Given {
                        angle: deg_to_angle(self.in_dir),
                        tension: in_tension,
                    }
                } else if self.in_curl_set {
                    Side::Curl {
                        curl: self.in_curl,
                        tension: in_tension,
                    }
                } else if self.out_set {
                    Side::Given {
                        angle: deg_to_angle(self.out_dir),
                        tension: in_tension,
                    }
                } else if self.out_curl_set {
                    Side::Curl {
                        curl: self.out_curl,
                        tension: in_tension,
                    }
                } else {
                    Side::Curl {
                        curl: 1.0,
                        tension: in_tension,
                    }
                }
            } else {
                Side::Open {
                    tension: in_tension,
                }
            };

            end.right = if is_last {
                if self.closed {
                    if self.close_out_set {
                        Side::Given {
                            angle: deg_to_angle(self.close_out),
                            tension: 1.0,
                        }
                    } else if self.close_out_curl_set {
                        Side::Curl {
                            curl: self.close_out_curl,
                            tension: 1.0,
                        }
                    } else if seg.line {
                        Side::Curl {
                            curl: 1.0,
                            tension: 1.0,
                        }
                    } else {
                        Side::Open { tension: 1.0 }
                    }
                } else {
                    Side::Endpoint
                }
            } else {
                let next = &self.segments[i + 1];
                let out_tension = if next.out_t_set { next.out_tension } else { 1.0 };
                if next.line {
                    Side::Curl {
                        curl: 1.0,
                        tension: out_tension,
                    }
                } else if next.out_curl_set {
                    Side::Curl {
                        curl: next.out_curl,
                        tension: out_tension,
                    }
                } else if next.explicit {
                    Side::explicit(next.ctrl1)
                } else if next.out_set {
                    Side::Given {
                        angle: deg_to_angle(next.out_dir),
                        tension: out_tension,
                    }
                } else {
                    Side::Open {
                        tension: out_tension,
                    }
                }
            };

            path.append(end);
        }

        path
    }

    /// Build, solve with `engine`, and apply the queued transforms.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPath`] when the builder has no start point or no
    /// segments.
    pub fn solve(&self, engine: &mut Engine) -> Result<Path, Error> {
        let mut path = self.build();
        engine.solve(&mut path)?;
        for t in &self.transforms {
            path.apply_transform(t);
        }
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_builds_empty_path() {
        assert!(PathBuilder::new().build().is_empty());
        assert!(PathBuilder::new().move_to(Point::ZERO).build().is_empty());
    }

    #[test]
    fn open_path_endpoints() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .curve_to(Point::new(10.0, 0.0))
            .build();
        let h = p.head().unwrap();
        assert!(p[h].left.is_endpoint());
        assert!(matches!(p[h].right, Side::Curl { curl, .. } if curl == 1.0));
        let tail = p.prev(h);
        assert!(p[tail].right.is_endpoint());
        assert!(matches!(p[tail].left, Side::Curl { curl, .. } if curl == 1.0));
    }

    #[test]
    fn line_to_sets_curl_both_sides() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .curve_to(Point::new(20.0, 10.0))
            .build();
        let h = p.head().unwrap();
        let mid = p.next(h);
        // A `--` on the incoming side makes the knot curl on both sides.
        assert!(matches!(p[mid].left, Side::Curl { .. }));
    }

    #[test]
    fn directions_are_scaled_degrees() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .out_direction(45.0)
            .in_direction(-30.0)
            .curve_to(Point::new(10.0, 0.0))
            .build();
        let h = p.head().unwrap();
        match p[h].right {
            Side::Given { angle, .. } => assert_eq!(angle, 45.0 * ANGLE_MULTIPLIER),
            other => panic!("expected Given, got {other:?}"),
        }
        let tail = p.prev(h);
        match p[tail].left {
            Side::Given { angle, .. } => assert_eq!(angle, -30.0 * ANGLE_MULTIPLIER),
            other => panic!("expected Given, got {other:?}"),
        }
    }

    #[test]
    fn tension_atleast_stored_negative() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .tension_atleast(1.5)
            .curve_to(Point::new(10.0, 0.0))
            .build();
        let h = p.head().unwrap();
        assert_eq!(p[h].right.tension(), -1.5);
    }

    #[test]
    fn close_makes_cycle_with_open_sides() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .curve_to(Point::new(10.0, 0.0))
            .curve_to(Point::new(5.0, 8.0))
            .close()
            .build();
        assert!(p.is_cycle());
        let h = p.head().unwrap();
        assert!(p[h].left.is_open());
        assert!(p[h].right.is_open());
    }

    #[test]
    fn trailing_direction_is_terminal_condition() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .curve_to(Point::new(10.0, 0.0))
            .out_direction(270.0)
            .build();
        let tail = p.prev(p.head().unwrap());
        assert!(matches!(p[tail].left, Side::Given { .. }));
    }

    #[test]
    fn explicit_controls_skip_solver() {
        let mut engine = Engine::new();
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .curve_to_with_controls(
                Point::new(30.0, 0.0),
                Point::new(10.0, 20.0),
                Point::new(20.0, 20.0),
            )
            .solve(&mut engine)
            .unwrap();
        let h = p.head().unwrap();
        assert_eq!(p[h].right_control(), (10.0, 20.0));
        let tail = p.prev(h);
        assert_eq!(p[tail].left_control(), (20.0, 20.0));
    }

    #[test]
    fn mixed_tensions_recorded_per_side() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .curve_to(Point::new(20.0, 30.0))
            .out_tension(1.5)
            .in_tension(1.0)
            .curve_to(Point::new(120.0, 30.0))
            .curve_to(Point::new(140.0, 0.0))
            .build();
        let h = p.head().unwrap();
        let k1 = p.next(h);
        assert_eq!(p[k1].right.tension(), 1.5);
        let k2 = p.next(k1);
        assert_eq!(p[k2].left.tension(), 1.0);
    }

    #[test]
    fn style_is_carried() {
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .stroke(Color::BLACK)
            .stroke_width(2.0)
            .line_cap(LineCap::Butt)
            .dashed(&[3.0, 3.0])
            .curve_to(Point::new(10.0, 0.0))
            .build();
        assert_eq!(p.style.stroke, Some(Color::BLACK));
        assert_eq!(p.style.stroke_width, 2.0);
        assert_eq!(p.style.line_cap, LineCap::Butt);
        assert!(p.style.dash.is_some());
    }

    #[test]
    fn solve_applies_queued_transforms() {
        let mut engine = Engine::new();
        let p = PathBuilder::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .shifted(5.0, 5.0)
            .solve(&mut engine)
            .unwrap();
        let start = p.point_of(0.0);
        assert!((start.x - 5.0).abs() < 1e-9 && (start.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn solve_without_segments_errors() {
        let mut engine = Engine::new();
        assert_eq!(
            PathBuilder::new().solve(&mut engine).unwrap_err(),
            Error::EmptyPath
        );
    }
}
