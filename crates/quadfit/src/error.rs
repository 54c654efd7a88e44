use thiserror::Error;

use crate::geom2::{Axis, BasisKind};

/// Invalid closed-quad input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuadError {
    #[error("closed quad needs exactly 5 points, got {0}")]
    WrongVertexCount(usize),

    #[error("closed quad must end where it starts")]
    NotClosed,
}

/// Degenerate geometry reported by strict-mode fitting.
///
/// Permissive mode never produces these; the same inputs yield NaN/Inf there.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum DegenerateGeometryError {
    #[error("{basis} basis edge toward vertex {vertex} has near-zero length ({length:e})")]
    ZeroLengthEdge {
        basis: BasisKind,
        vertex: usize,
        length: f64,
    },

    #[error("{basis} basis is singular (determinant {determinant:e})")]
    SingularBasis { basis: BasisKind, determinant: f64 },

    #[error("fit scale denominator along the {axis} axis is near zero ({denominator:e})")]
    ScaleDenominator { axis: Axis, denominator: f64 },

    #[error("reference rectangle has near-zero width ({width:e})")]
    DegenerateReference { width: f64 },
}
