//! Curve construction in the manner of `MetaPost`.
//!
//! This crate reproduces the mathematical core of `MetaPost`'s curve
//! engine: given a high-level path description (points with optional
//! direction, tension and curl annotations, optionally cyclic) it computes
//! the cubic Bezier control points of the Hobby–Knuth smooth spline, sweeps
//! polygonal pens into filled envelope outlines, and answers path queries
//! (point-at-time, subpath, arc length and arc time, intersection,
//! direction time, build-cycle).
//!
//! The numeric layer mirrors the scaling of `MetaPost`'s double backend
//! (fractions times 4096, degrees times 16) so that thresholds, and
//! therefore outputs, match the original.
//!
//! ```
//! use metacurve::{Engine, PathBuilder, Point};
//!
//! let mut engine = Engine::new();
//! let circle = PathBuilder::new()
//!     .move_to(Point::new(80.0, 0.0))
//!     .curve_to(Point::new(0.0, 80.0))
//!     .curve_to(Point::new(-80.0, 0.0))
//!     .curve_to(Point::new(0.0, -80.0))
//!     .curve_to(Point::new(80.0, 0.0))
//!     .close()
//!     .solve(&mut engine)
//!     .unwrap();
//! assert!((circle.arc_length() - 2.0 * std::f64::consts::PI * 80.0).abs() < 0.5);
//! ```
//!
//! Rendering, fonts, colour parsing and the `MetaPost` language itself are
//! out of scope; the crate is a pure computational library over f64.

pub mod arrow;
pub mod bbox;
pub mod bezier;
pub mod builder;
pub mod envelope;
pub mod error;
pub mod intersection;
pub mod math;
mod offset;
pub mod path;
pub mod pen;
pub mod predefined;
pub mod transform;
pub mod types;

pub use bbox::BoundingBox;
pub use builder::PathBuilder;
pub use error::Error;
pub use intersection::build_cycle;
pub use path::hobby::Engine;
pub use path::{KnotId, Path};
pub use pen::Pen;
pub use transform::Transform;
pub use types::{
    ArrowStyle, Color, DashPattern, Knot, KnotOrigin, LineCap, LineJoin, Point, Scalar, Side,
    Style, Vec2,
};
