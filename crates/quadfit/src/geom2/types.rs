//! Basic 2D types and tolerances used by the fitting routine.
//!
//! - `FitCfg`: validation mode plus the epsilons strict mode checks against.
//! - `Basis`: oblique 2D frame stored as a homogeneous 3x3 matrix.
//! - `Rotation`: homogeneous rotation about a pivot, advanced per animation tick.
//! - `translation_matrix`, `uniform_scale_matrix`: the other two affine factors.
//!
//! References
//! - Code cross-refs: `fit::{derive_bases, fit}`, `quad::{ClosedQuad, ReferenceRect}`

use std::fmt;

use nalgebra::{Matrix3, Vector2, Vector3};

/// 2D point or direction.
pub type Vec2 = Vector2<f64>;

/// How degenerate geometry is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validation {
    /// No guards: zero-length edges and zero denominators propagate NaN/Inf.
    #[default]
    Permissive,
    /// Report `DegenerateGeometryError` instead of producing non-finite output.
    Strict,
}

/// Fitting configuration (mode and tolerances).
#[derive(Clone, Copy, Debug)]
pub struct FitCfg {
    pub mode: Validation,
    /// Minimum edge length accepted before normalization.
    pub eps_edge: f64,
    /// Minimum |det| of a basis before it counts as singular.
    pub eps_det: f64,
    /// Minimum |denominator| in the fit-scale ratios.
    pub eps_denom: f64,
}

impl Default for FitCfg {
    fn default() -> Self {
        Self {
            mode: Validation::Permissive,
            eps_edge: 1e-9,
            eps_det: 1e-12,
            eps_denom: 1e-9,
        }
    }
}

impl FitCfg {
    /// Default tolerances with strict validation.
    pub fn strict() -> Self {
        Self {
            mode: Validation::Strict,
            ..Self::default()
        }
    }
    #[inline]
    pub fn is_strict(&self) -> bool {
        self.mode == Validation::Strict
    }
}

/// Which of the two fitted frames a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasisKind {
    /// Anchored at quad vertex 0.
    Direct,
    /// Anchored at quad vertex 2, diagonally opposite.
    Diagonal,
}

impl fmt::Display for BasisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisKind::Direct => f.write_str("direct"),
            BasisKind::Diagonal => f.write_str("diagonal"),
        }
    }
}

/// Coordinate axis of a basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Apply an affine 3x3 matrix to `p` in homogeneous form `(x, y, 1)`.
///
/// The `w` row is dropped; all matrices built here keep it at `(0, 0, 1)`.
#[inline]
pub fn apply(m: &Matrix3<f64>, p: Vec2) -> Vec2 {
    let h = m * Vector3::new(p.x, p.y, 1.0);
    Vec2::new(h.x, h.y)
}

/// Homogeneous translation by `t`.
#[inline]
pub fn translation_matrix(t: Vec2) -> Matrix3<f64> {
    Matrix3::new_translation(&t)
}

/// Translation column of an affine matrix.
#[inline]
pub fn translation_of(m: &Matrix3<f64>) -> Vec2 {
    Vec2::new(m[(0, 2)], m[(1, 2)])
}

/// Homogeneous uniform scale: `s` on the x/y diagonal, `(2,2)` stays 1.
#[inline]
pub fn uniform_scale_matrix(s: f64) -> Matrix3<f64> {
    Matrix3::new_nonuniform_scaling(&Vec2::new(s, s))
}

/// Oblique 2D frame: columns are unit X axis, unit Y axis, origin.
///
/// Axes are not required to be orthogonal. A point with local coordinates
/// `(a, b)` sits at `origin + a * x_axis + b * y_axis` in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    m: Matrix3<f64>,
}

impl Basis {
    /// Build from axis directions and origin. Axes are stored as given.
    #[inline]
    pub fn new(x_axis: Vec2, y_axis: Vec2, origin: Vec2) -> Self {
        Self {
            m: Matrix3::new(
                x_axis.x, y_axis.x, origin.x, //
                x_axis.y, y_axis.y, origin.y, //
                0.0, 0.0, 1.0,
            ),
        }
    }
    #[inline]
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.m
    }
    #[inline]
    pub fn x_axis(&self) -> Vec2 {
        Vec2::new(self.m[(0, 0)], self.m[(1, 0)])
    }
    #[inline]
    pub fn y_axis(&self) -> Vec2 {
        Vec2::new(self.m[(0, 1)], self.m[(1, 1)])
    }
    #[inline]
    pub fn origin(&self) -> Vec2 {
        translation_of(&self.m)
    }
    /// Signed area spanned by the two axes.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.m.determinant()
    }
    /// World → local matrix, or `None` if the axes are parallel.
    #[inline]
    pub fn inverse(&self) -> Option<Matrix3<f64>> {
        self.m.try_inverse()
    }
    /// World → local matrix; a singular basis yields an all-NaN matrix so the
    /// failure travels through every product it enters.
    #[inline]
    pub fn inverse_or_nan(&self) -> Matrix3<f64> {
        self.inverse()
            .unwrap_or_else(|| Matrix3::from_element(f64::NAN))
    }
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        apply(&self.m, local)
    }
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Option<Vec2> {
        self.inverse().map(|inv| apply(&inv, world))
    }
    /// Left-multiply by an affine map (e.g. undo a rotation).
    #[inline]
    pub fn transformed(&self, m: &Matrix3<f64>) -> Self {
        Self { m: m * self.m }
    }
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }
}

/// Homogeneous rotation by `angle` (radians, counter-clockwise) about `pivot`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub angle: f64,
    pub pivot: Vec2,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    #[inline]
    pub fn identity() -> Self {
        Self::about_origin(0.0)
    }
    #[inline]
    pub fn about_origin(angle: f64) -> Self {
        Self {
            angle,
            pivot: Vec2::zeros(),
        }
    }
    #[inline]
    pub fn about(pivot: Vec2, angle: f64) -> Self {
        Self { angle, pivot }
    }
    /// Same pivot, angle advanced by `step`.
    #[inline]
    pub fn advanced(&self, step: f64) -> Self {
        Self {
            angle: self.angle + step,
            pivot: self.pivot,
        }
    }
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            angle: -self.angle,
            pivot: self.pivot,
        }
    }
    /// `T(pivot) · R(angle) · T(-pivot)`; a pure rotation when the pivot is the origin.
    pub fn matrix(&self) -> Matrix3<f64> {
        let r = Matrix3::new_rotation(self.angle);
        if self.pivot == Vec2::zeros() {
            return r;
        }
        translation_matrix(self.pivot) * r * translation_matrix(-self.pivot)
    }
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        apply(&self.matrix(), p)
    }
}
