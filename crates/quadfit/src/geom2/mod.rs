//! 2D value types for quad fitting.
//!
//! Purpose
//! - Points, oblique bases and the three homogeneous affine factors
//!   (translation, uniform scale, rotation) the fitting routine composes.
//! - Closed 5-point polygons (`ClosedQuad`, `ReferenceRect`) whose closure is
//!   enforced by construction, plus the tap collector that builds quads.
//! - Convex-hull containment and a deterministic random-quad sampler.
//!
//! Code cross-refs: `fit::{derive_bases, fit}`, `animate::Animator`

pub mod hull;
pub mod quad;
pub mod rand;
mod types;

pub use hull::{convex_hull, ConvexRegion, HalfPlane};
pub use quad::{ClosedQuad, ReferenceRect, TapOutcome, TapSequence, CLOSED_LEN};
pub use types::{
    apply, translation_matrix, translation_of, uniform_scale_matrix, Axis, Basis, BasisKind,
    FitCfg, Rotation, Validation, Vec2,
};

#[cfg(test)]
mod tests;
