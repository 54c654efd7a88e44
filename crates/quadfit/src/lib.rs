//! Fit a reference rectangle into a four-point quad.
//!
//! A user taps four corners; the crate derives two oblique bases from them,
//! anchors the rectangle at the first corner and picks the uniform scale that
//! keeps it inside the quad. An animator re-runs the fit every frame while the
//! quad spins.
//!
//! Layout
//! - `geom2`: points, bases, affine factors, closed quads, hulls, sampler.
//! - `fit`: `derive_bases` → `fit_translation` → `compute_fit_scale` →
//!   `apply_scale`, bundled as `fit`.
//! - `animate`: Idle/Fitting state machine driven by an injected clock.
//! - `error`: strict-mode and input errors.

pub mod animate;
pub mod api;
pub mod error;
pub mod fit;
pub mod geom2;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{DegenerateGeometryError, QuadError};
pub use fit::{fit, FitResult};
pub use geom2::{ClosedQuad, FitCfg, ReferenceRect, Rotation, Vec2};
/// Homogeneous 2D affine matrix.
pub type Mat3 = nalgebra::Matrix3<f64>;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::animate::{AnimationCfg, Animator, Clock, Frame, ManualClock, Phase, SystemClock};
    pub use crate::fit::{
        apply_scale, compute_fit_scale, derive_bases, fit, fit_translation,
        reference_within_quad, Bases, FitResult,
    };
    pub use crate::geom2::rand::{draw_convex_quad, draw_convex_quad_retry, QuadCfg, ReplayToken};
    pub use crate::geom2::{
        Basis, BasisKind, ClosedQuad, FitCfg, ReferenceRect, Rotation, TapOutcome, TapSequence,
        Validation, Vec2,
    };
    pub use crate::{DegenerateGeometryError, QuadError};
    pub use crate::Mat3;
}

/// Signed area of the parallelogram spanned by `a` and `b`: the determinant
/// of a basis with these axes, and the corner turn used by the convexity test.
#[inline]
pub fn parallelogram_area(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}
