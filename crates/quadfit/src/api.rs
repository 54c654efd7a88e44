//! Curated re-export surface for callers (CLI, benches, demos).
//!
//! Not a stability promise; names follow the modules they come from.

// 2D values
pub use crate::geom2::{
    apply, translation_matrix, translation_of, uniform_scale_matrix, Axis, Basis, BasisKind,
    ClosedQuad, ConvexRegion, FitCfg, ReferenceRect, Rotation, TapOutcome, TapSequence,
    Validation, Vec2,
};
// Random quads
pub use crate::geom2::rand::{
    draw_convex_quad, draw_convex_quad_retry, QuadCfg, ReplayToken as QuadReplay,
};
// Fitting
pub use crate::fit::{
    apply_scale, compute_fit_scale, derive_bases, fit, fit_translation, reference_within_quad,
    Bases, FitOutcome, FitResult,
};
// Animation
pub use crate::animate::{AnimationCfg, Animator, Clock, Frame, ManualClock, Phase, SystemClock};
pub use crate::error::{DegenerateGeometryError, QuadError};
