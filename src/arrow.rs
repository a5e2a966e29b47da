//! Arrowheads and the path shortening that makes room for them.
//!
//! Arrowheads are small closed triangles built from the tangent at a path
//! terminus; they are separate filled paths, never part of the stroked
//! outline. Before drawing, the main path is pulled back along that tangent
//! by `length * cos(angle/2)` so the arrow tip meets the line end cleanly.

use crate::path::Path;
use crate::types::{Knot, Point, Scalar, Side};

/// Minimum usable tangent length; shorter ones are treated as degenerate.
const MIN_TANGENT: Scalar = 1e-4;

/// Direction out of the last knot (unit vector), falling back to the chord
/// when the incoming control collapses onto the anchor.
fn end_direction(path: &Path) -> Option<(Point, Scalar, Scalar)> {
    let head = path.head()?;
    let tail = path.prev(head);
    let k = &path[tail];
    let (lx, ly) = k.left_control();
    let mut dx = k.x - lx;
    let mut dy = k.y - ly;
    if dx == 0.0 && dy == 0.0 {
        let prev = path.prev(tail);
        dx = k.x - path[prev].x;
        dy = k.y - path[prev].y;
    }
    let len = dx.hypot(dy);
    if len < MIN_TANGENT {
        return None;
    }
    Some((k.point(), dx / len, dy / len))
}

/// Direction into the first knot (unit vector), reversed so it points
/// toward the start.
fn start_direction(path: &Path) -> Option<(Point, Scalar, Scalar)> {
    let head = path.head()?;
    let k = &path[head];
    let (rx, ry) = k.right_control();
    let mut dx = rx - k.x;
    let mut dy = ry - k.y;
    if dx == 0.0 && dy == 0.0 {
        let next = path.next(head);
        dx = path[next].x - k.x;
        dy = path[next].y - k.y;
    }
    let len = dx.hypot(dy);
    if len < MIN_TANGENT {
        return None;
    }
    Some((k.point(), -dx / len, -dy / len))
}

/// A filled triangular arrowhead at the end of `path`.
///
/// `length` is the side length of the head; `angle` its full opening angle
/// in degrees. Returns `None` for a degenerate terminus.
#[must_use]
pub fn arrow_head_end(path: &Path, length: Scalar, angle: Scalar) -> Option<Path> {
    let (tip, dx, dy) = end_direction(path)?;
    Some(triangle_at(tip, dx, dy, length, angle))
}

/// A filled triangular arrowhead at the start of `path`, pointing backward.
#[must_use]
pub fn arrow_head_start(path: &Path, length: Scalar, angle: Scalar) -> Option<Path> {
    let (tip, dx, dy) = start_direction(path)?;
    Some(triangle_at(tip, dx, dy, length, angle))
}

/// Build the triangle: apex at `tip`, unit direction `(dx, dy)` pointing at
/// the tip, sides of `length` spread by `angle` degrees.
fn triangle_at(tip: Point, dx: Scalar, dy: Scalar, length: Scalar, angle: Scalar) -> Path {
    let half = angle * std::f64::consts::PI / 360.0;
    let (sin, cos) = half.sin_cos();

    // Base direction points away from the tip.
    let bx = -dx;
    let by = -dy;
    let lx = bx * cos - by * sin;
    let ly = bx * sin + by * cos;
    let rx = bx * cos + by * sin;
    let ry = -bx * sin + by * cos;

    let left = Point::new(tip.x + lx * length, tip.y + ly * length);
    let right = Point::new(tip.x + rx * length, tip.y + ry * length);

    let mut arrow = Path::new();
    for p in [left, tip, right] {
        let mut k = Knot::new(p.x, p.y);
        k.left = Side::explicit(p);
        k.right = Side::explicit(p);
        arrow.append(k);
    }
    arrow
}

/// The pull-back that makes room for an arrowhead of the given dimensions:
/// `length * cos(angle / 2)`, the distance from the head's tip to its base.
#[must_use]
pub fn arrow_shorten_amount(length: Scalar, angle: Scalar) -> Scalar {
    length * (angle.to_radians() / 2.0).cos()
}

/// A copy of `path` with the ends pulled inward along their tangents.
///
/// Controls adjacent to the moved anchors shift with them so the terminal
/// direction is preserved. Ends with degenerate tangents are left alone.
#[must_use]
pub fn shorten_for_arrows(path: &Path, shorten_start: Scalar, shorten_end: Scalar) -> Path {
    let mut out = path.copy();
    let Some(head) = out.head() else {
        return out;
    };

    if shorten_end > 0.0 {
        let tail = out.prev(head);
        if let Some((_, dx, dy)) = end_direction(&out) {
            let k = &mut out[tail];
            k.x -= dx * shorten_end;
            k.y -= dy * shorten_end;
            if let Side::Explicit { x, y } = k.left {
                k.left = Side::Explicit {
                    x: x - dx * shorten_end,
                    y: y - dy * shorten_end,
                };
            }
        }
    }

    if shorten_start > 0.0 {
        if let Some((_, bx, by)) = start_direction(&out) {
            // start_direction points backward; move forward along the path.
            let (dx, dy) = (-bx, -by);
            let k = &mut out[head];
            k.x += dx * shorten_start;
            k.y += dy * shorten_start;
            if let Side::Explicit { x, y } = k.right {
                k.right = Side::Explicit {
                    x: x + dx * shorten_start,
                    y: y + dy * shorten_start,
                };
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_ARROW_ANGLE, DEFAULT_ARROW_LENGTH};

    fn line(x0: Scalar, y0: Scalar, x1: Scalar, y1: Scalar) -> Path {
        let mut p = Path::new();
        let mut k0 = Knot::new(x0, y0);
        k0.left = Side::Endpoint;
        k0.right = Side::Explicit { x: x0, y: y0 };
        p.append(k0);
        let mut k1 = Knot::new(x1, y1);
        k1.left = Side::Explicit { x: x1, y: y1 };
        k1.right = Side::Endpoint;
        p.append(k1);
        p
    }

    #[test]
    fn end_arrow_tip_at_terminus() {
        let p = line(0.0, 0.0, 100.0, 0.0);
        let arrow = arrow_head_end(&p, DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE).unwrap();
        let ids = arrow.ring_ids();
        assert_eq!(ids.len(), 3);
        let tip = &arrow[ids[1]];
        assert!((tip.x - 100.0).abs() < 1e-3 && tip.y.abs() < 1e-3);

        // The two base corners sit symmetric about the line, one side
        // length back from the tip.
        let left = &arrow[ids[0]];
        let right = &arrow[ids[2]];
        assert!((left.x - right.x).abs() < 1e-3);
        assert!((left.y + right.y).abs() < 1e-3);
        let expected_x = 100.0 - DEFAULT_ARROW_LENGTH * (DEFAULT_ARROW_ANGLE.to_radians() / 2.0).cos();
        assert!((left.x - expected_x).abs() < 0.01, "left.x = {}", left.x);
    }

    #[test]
    fn arrow_sides_have_requested_length() {
        let p = line(0.0, 0.0, 100.0, 0.0);
        let arrow = arrow_head_end(&p, DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE).unwrap();
        let ids = arrow.ring_ids();
        let (left, tip, right) = (&arrow[ids[0]], &arrow[ids[1]], &arrow[ids[2]]);
        let l = (tip.x - left.x).hypot(tip.y - left.y);
        let r = (tip.x - right.x).hypot(tip.y - right.y);
        assert!((l - DEFAULT_ARROW_LENGTH).abs() < 0.01);
        assert!((r - DEFAULT_ARROW_LENGTH).abs() < 0.01);
        // Half-width at the base is length * sin(angle/2).
        let half_width = DEFAULT_ARROW_LENGTH * (DEFAULT_ARROW_ANGLE.to_radians() / 2.0).sin();
        assert!((left.y.abs() - half_width).abs() < 0.01);
    }

    #[test]
    fn start_arrow_points_backward() {
        let p = line(0.0, 0.0, 100.0, 0.0);
        let arrow = arrow_head_start(&p, DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE).unwrap();
        let ids = arrow.ring_ids();
        let tip = &arrow[ids[1]];
        assert!(tip.x.abs() < 1e-3 && tip.y.abs() < 1e-3);
        // Base corners lie forward of the tip.
        assert!(arrow[ids[0]].x > tip.x);
    }

    #[test]
    fn vertical_line_arrow() {
        let p = line(0.0, 0.0, 0.0, 100.0);
        let arrow = arrow_head_end(&p, DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE).unwrap();
        let ids = arrow.ring_ids();
        let tip = &arrow[ids[1]];
        assert!(tip.x.abs() < 1e-3 && (tip.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn shorten_amount_reaches_arrow_base() {
        // Shortening by the standard amount puts the path end exactly at
        // the arrowhead's base line.
        let p = line(0.0, 0.0, 100.0, 0.0);
        let arrow = arrow_head_end(&p, DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE).unwrap();
        let base_x = arrow[arrow.ring_ids()[0]].x;
        let s = shorten_for_arrows(
            &p,
            0.0,
            arrow_shorten_amount(DEFAULT_ARROW_LENGTH, DEFAULT_ARROW_ANGLE),
        );
        let tail = s.prev(s.head().unwrap());
        assert!((s[tail].x - base_x).abs() < 1e-9);
    }

    #[test]
    fn shorten_moves_both_ends() {
        let p = line(0.0, 0.0, 100.0, 0.0);
        let s = shorten_for_arrows(&p, 10.0, 10.0);
        let h = s.head().unwrap();
        assert!((s[h].x - 10.0).abs() < 1e-3);
        let tail = s.prev(h);
        assert!((s[tail].x - 90.0).abs() < 1e-3);
        // Original untouched.
        let oh = p.head().unwrap();
        assert_eq!(p[oh].x, 0.0);
    }

    #[test]
    fn shorten_diagonal_by_arc() {
        let p = line(0.0, 0.0, 100.0, 100.0);
        let s = shorten_for_arrows(&p, 0.0, 10.0 * std::f64::consts::SQRT_2);
        let tail = s.prev(s.head().unwrap());
        assert!((s[tail].x - 90.0).abs() < 0.1 && (s[tail].y - 90.0).abs() < 0.1);
    }

    #[test]
    fn degenerate_path_yields_no_arrow() {
        let p = line(5.0, 5.0, 5.0, 5.0);
        assert!(arrow_head_end(&p, 4.0, 45.0).is_none());
        assert!(arrow_head_start(&p, 4.0, 45.0).is_none());
    }
}
