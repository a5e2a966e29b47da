//! Core types shared across the crate.

use std::sync::Arc;

use crate::math::UNITY;
use crate::pen::Pen;

pub use kurbo::{Point, Vec2};

/// Convenience alias. `MetaPost` historically used 16.16 fixed-point; the
/// double backend (and this crate) uses f64 throughout.
pub type Scalar = f64;

// ---------------------------------------------------------------------------
// Boundary sides
// ---------------------------------------------------------------------------

/// Boundary condition on one side of a [`Knot`].
///
/// The original engine overloaded the control-point fields to carry angles,
/// curls and tensions depending on a type tag; here each variant carries its
/// own payload. Angles are in `MetaPost`-scaled degrees (degrees times 16);
/// a negative tension means "tension at least |t|".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Side {
    /// The path terminates on this side.
    Endpoint,
    /// A computed (or caller-supplied) Bezier control point.
    Explicit { x: Scalar, y: Scalar },
    /// A prescribed tangent direction.
    Given { angle: Scalar, tension: Scalar },
    /// A prescribed curl (mock curvature) at a path end.
    Curl { curl: Scalar, tension: Scalar },
    /// Let the solver choose the direction.
    Open { tension: Scalar },
    /// Internal sentinel marking the head of a fully open cycle.
    EndCycle { tension: Scalar },
}

impl Default for Side {
    /// An open side with tension 1.
    fn default() -> Self {
        Self::Open { tension: UNITY }
    }
}

impl Side {
    /// An explicit control point from a [`Point`].
    #[must_use]
    pub const fn explicit(p: Point) -> Self {
        Self::Explicit { x: p.x, y: p.y }
    }

    /// Raw tension carried by this side (1 where no tension is stored).
    ///
    /// The sign is preserved: negative means "at least".
    #[must_use]
    pub const fn tension(&self) -> Scalar {
        match *self {
            Self::Given { tension, .. }
            | Self::Curl { tension, .. }
            | Self::Open { tension }
            | Self::EndCycle { tension } => tension,
            Self::Endpoint | Self::Explicit { .. } => UNITY,
        }
    }

    /// True for the variants the solver still has to resolve
    /// (`Given`, `Curl`, `Open`, `EndCycle`).
    #[must_use]
    pub const fn needs_solving(&self) -> bool {
        !matches!(self, Self::Endpoint | Self::Explicit { .. })
    }

    #[must_use]
    pub const fn is_endpoint(&self) -> bool {
        matches!(self, Self::Endpoint)
    }

    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit { .. })
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// The control point as coordinates, falling back to the anchor when the
    /// side carries no explicit control.
    #[must_use]
    pub const fn control_or(&self, anchor_x: Scalar, anchor_y: Scalar) -> (Scalar, Scalar) {
        match *self {
            Self::Explicit { x, y } => (x, y),
            _ => (anchor_x, anchor_y),
        }
    }
}

// ---------------------------------------------------------------------------
// Knot
// ---------------------------------------------------------------------------

/// Who created a knot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnotOrigin {
    /// Supplied by the caller.
    #[default]
    User,
    /// Introduced by the engine during splitting or envelope insertion.
    Program,
}

/// One anchor on a path, with its two flanking boundary sides.
///
/// `next`/`prev` are arena indices maintained by [`crate::path::Path`]; the
/// `info` field is scratch storage for the offset/envelope pipeline
/// (pen-walk step counts biased by `ZERO_OFF`).
#[derive(Debug, Clone, PartialEq)]
pub struct Knot {
    pub x: Scalar,
    pub y: Scalar,
    pub left: Side,
    pub right: Side,
    pub origin: KnotOrigin,
    pub(crate) info: i32,
    pub(crate) next: usize,
    pub(crate) prev: usize,
}

impl Knot {
    /// A knot at `(x, y)` with open sides and tension 1.
    #[must_use]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self {
            x,
            y,
            left: Side::Open { tension: UNITY },
            right: Side::Open { tension: UNITY },
            origin: KnotOrigin::User,
            info: 0,
            next: 0,
            prev: 0,
        }
    }

    /// A knot with explicit controls on both sides.
    #[must_use]
    pub const fn with_controls(x: Scalar, y: Scalar, left: Point, right: Point) -> Self {
        Self {
            x,
            y,
            left: Side::Explicit { x: left.x, y: left.y },
            right: Side::Explicit {
                x: right.x,
                y: right.y,
            },
            origin: KnotOrigin::User,
            info: 0,
            next: 0,
            prev: 0,
        }
    }

    /// The anchor as a [`Point`].
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Incoming control point (anchor when not explicit).
    #[must_use]
    pub const fn left_control(&self) -> (Scalar, Scalar) {
        self.left.control_or(self.x, self.y)
    }

    /// Outgoing control point (anchor when not explicit).
    #[must_use]
    pub const fn right_control(&self) -> (Scalar, Scalar) {
        self.right.control_or(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGB color with components in [0, 1].
///
/// Interpretation (including `None` in [`Style`] meaning "no paint") is the
/// backend's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    #[must_use]
    pub const fn new(r: Scalar, g: Scalar, b: Scalar) -> Self {
        Self { r, g, b }
    }
}

// ---------------------------------------------------------------------------
// LineCap / LineJoin
// ---------------------------------------------------------------------------

/// Stroke line-cap styles. `MetaPost`'s default is round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt = 0,
    #[default]
    Round = 1,
    Square = 2,
}

/// Stroke line-join styles. `MetaPost`'s default is round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter = 0,
    #[default]
    Round = 1,
    Bevel = 2,
}

// ---------------------------------------------------------------------------
// DashPattern
// ---------------------------------------------------------------------------

/// A dash pattern: alternating on/off lengths with a phase offset.
///
/// Formatting for any particular backend is out of scope; the pattern is
/// carried as data only.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    /// Alternating on, off, on, off, ... lengths.
    pub array: Vec<Scalar>,
    /// Starting offset into the pattern.
    pub offset: Scalar,
}

impl DashPattern {
    /// Pattern from alternating on/off lengths; `None` when empty.
    #[must_use]
    pub fn new(on_off: &[Scalar]) -> Option<Self> {
        if on_off.is_empty() {
            return None;
        }
        Some(Self {
            array: on_off.to_vec(),
            offset: 0.0,
        })
    }

    /// The standard "evenly" pattern: on 3 off 3.
    #[must_use]
    pub fn evenly() -> Self {
        Self {
            array: vec![3.0, 3.0],
            offset: 0.0,
        }
    }

    /// The "withdots" pattern: a zero-length dash every 5 units, phase 2.5.
    /// Produces dots under a round line cap.
    #[must_use]
    pub fn with_dots() -> Self {
        Self {
            array: vec![0.0, 5.0],
            offset: 2.5,
        }
    }

    /// All lengths and the offset multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Scalar) -> Self {
        Self {
            array: self.array.iter().map(|v| v * factor).collect(),
            offset: self.offset * factor,
        }
    }

    /// Phase-shifted copy.
    #[must_use]
    pub fn shifted(&self, offset: Scalar) -> Self {
        Self {
            array: self.array.clone(),
            offset: self.offset + offset,
        }
    }
}

// ---------------------------------------------------------------------------
// ArrowStyle
// ---------------------------------------------------------------------------

/// Default arrowhead length in big points.
pub const DEFAULT_ARROW_LENGTH: Scalar = 4.0;

/// Default arrowhead opening angle in degrees.
pub const DEFAULT_ARROW_ANGLE: Scalar = 45.0;

/// Arrowhead toggles and dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    pub start: bool,
    pub end: bool,
    pub length: Scalar,
    pub angle: Scalar,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            start: false,
            end: false,
            length: DEFAULT_ARROW_LENGTH,
            angle: DEFAULT_ARROW_ANGLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Drawing attributes attached to a path.
///
/// The core only consumes this record (the envelope builder reads the pen,
/// joins and caps); interpretation of colours, widths and dashes belongs to
/// the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke: Option<Color>,
    pub stroke_width: Scalar,
    pub fill: Option<Color>,
    /// Shared pen reference; the solver never mutates the pen.
    pub pen: Option<Arc<Pen>>,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub miter_limit: Scalar,
    pub dash: Option<DashPattern>,
    pub arrow: ArrowStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: None,
            // pencircle scaled 0.5bp, the MetaPost default pen width.
            stroke_width: 0.5,
            fill: None,
            pen: None,
            line_join: LineJoin::default(),
            line_cap: LineCap::default(),
            miter_limit: 4.0,
            dash: None,
            arrow: ArrowStyle::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_tension_defaults() {
        assert_eq!(Side::Endpoint.tension(), 1.0);
        assert_eq!(Side::Open { tension: 2.0 }.tension(), 2.0);
        assert_eq!(
            Side::Given {
                angle: 0.0,
                tension: -1.5
            }
            .tension(),
            -1.5
        );
    }

    #[test]
    fn side_needs_solving() {
        assert!(Side::Open { tension: 1.0 }.needs_solving());
        assert!(Side::Curl {
            curl: 1.0,
            tension: 1.0
        }
        .needs_solving());
        assert!(!Side::Endpoint.needs_solving());
        assert!(!Side::Explicit { x: 0.0, y: 0.0 }.needs_solving());
    }

    #[test]
    fn side_control_fallback() {
        let s = Side::Explicit { x: 3.0, y: 4.0 };
        assert_eq!(s.control_or(1.0, 1.0), (3.0, 4.0));
        assert_eq!(Side::Endpoint.control_or(1.0, 2.0), (1.0, 2.0));
    }

    #[test]
    fn knot_defaults() {
        let k = Knot::new(1.0, 2.0);
        assert_eq!(k.point(), Point::new(1.0, 2.0));
        assert!(k.left.is_open());
        assert!(k.right.is_open());
        assert_eq!(k.origin, KnotOrigin::User);
    }

    #[test]
    fn dash_evenly() {
        let d = DashPattern::evenly();
        assert_eq!(d.array, vec![3.0, 3.0]);
        assert_eq!(d.offset, 0.0);
    }

    #[test]
    fn dash_with_dots() {
        let d = DashPattern::with_dots();
        assert_eq!(d.array, vec![0.0, 5.0]);
        assert_eq!(d.offset, 2.5);
    }

    #[test]
    fn dash_scaled_and_shifted() {
        let d = DashPattern::evenly().scaled(2.0);
        assert_eq!(d.array, vec![6.0, 6.0]);
        let d = d.shifted(1.5);
        assert_eq!(d.offset, 1.5);
    }

    #[test]
    fn dash_empty_is_none() {
        assert!(DashPattern::new(&[]).is_none());
    }

    #[test]
    fn style_defaults() {
        let s = Style::default();
        assert_eq!(s.line_cap, LineCap::Round);
        assert_eq!(s.line_join, LineJoin::Round);
        assert_eq!(s.miter_limit, 4.0);
        assert_eq!(s.stroke_width, 0.5);
        assert!(s.pen.is_none());
    }
}
