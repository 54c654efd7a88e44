//! Quadrilateral fitting: place and size a reference rectangle inside a tapped quad.
//!
//! Purpose
//! - Derive two oblique bases from the quad: the *direct* basis anchored at
//!   vertex 0 and the *diagonal* basis anchored at the opposite vertex 2, both
//!   with axes pointing at vertices 3 and 1.
//! - Translate the reference so its local minimum corner (direct basis) sits
//!   on vertex 0, then pick the largest uniform scale about vertex 0 that keeps
//!   the rectangle's local minimum (diagonal basis) non-negative.
//!
//! Pipeline (strict order): `derive_bases` → `fit_translation` →
//! `compute_fit_scale` → `apply_scale`, bundled by `fit`. Every step is a pure
//! function of its arguments; the caller threads the returned `FitResult` into
//! the next frame.
//!
//! Degenerate input
//! - `Validation::Permissive` (default) has no guards: coincident taps or a
//!   zero-extent rectangle yield NaN/Inf in the result.
//! - `Validation::Strict` reports a `DegenerateGeometryError` instead.
//!
//! Code cross-refs: `geom2::{Basis, ClosedQuad, ReferenceRect, Rotation, FitCfg}`,
//! `animate::Animator`

use nalgebra::Matrix3;

use crate::error::DegenerateGeometryError;
use crate::geom2::{
    apply, translation_matrix, translation_of, uniform_scale_matrix, Axis, Basis, BasisKind,
    ClosedQuad, FitCfg, ReferenceRect, Rotation, Vec2, CLOSED_LEN,
};

pub type FitOutcome<T> = Result<T, DegenerateGeometryError>;

/// The two frames derived from a quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bases {
    pub direct: Basis,
    pub diagonal: Basis,
}

/// Everything one fit pass produces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    pub bases: Bases,
    /// Translation-only matrix.
    pub transition: Matrix3<f64>,
    /// Uniform scale on the x/y diagonal.
    pub scale_matrix: Matrix3<f64>,
    /// Ratio returned by `compute_fit_scale`.
    pub fit_scale: f64,
    /// Rotation the quad was fitted under.
    pub rotation: Rotation,
}

impl FitResult {
    /// `transition · scale`: maps the reference rectangle onto its fitted place.
    #[inline]
    pub fn reference_transform(&self) -> Matrix3<f64> {
        self.transition * self.scale_matrix
    }

    /// `inverse(transition · scale) · rotation`: maps the rotated quad into the
    /// reference frame. `None` if the scale collapsed to zero.
    pub fn snap_transform(&self) -> Option<Matrix3<f64>> {
        self.reference_transform()
            .try_inverse()
            .map(|inv| inv * self.rotation.matrix())
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        translation_of(&self.transition)
    }

    /// Scale actually applied (diagonal entry of `scale_matrix`).
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale_matrix[(0, 0)]
    }

    pub fn place_reference(&self, reference: &ReferenceRect) -> [Vec2; CLOSED_LEN] {
        let m = self.reference_transform();
        reference.points().map(|p| apply(&m, p))
    }

    pub fn is_finite(&self) -> bool {
        self.bases.direct.is_finite()
            && self.bases.diagonal.is_finite()
            && self.transition.iter().all(|v| v.is_finite())
            && self.scale_matrix.iter().all(|v| v.is_finite())
            && self.fit_scale.is_finite()
    }
}

/// Unit vector from `from` toward `to`. Permissive mode divides by whatever
/// the length is, including zero.
#[inline]
fn unit_edge(
    from: Vec2,
    to: Vec2,
    basis: BasisKind,
    vertex: usize,
    cfg: FitCfg,
) -> FitOutcome<Vec2> {
    let e = to - from;
    let length = e.norm();
    if cfg.is_strict() && !(length > cfg.eps_edge) {
        return Err(DegenerateGeometryError::ZeroLengthEdge {
            basis,
            vertex,
            length,
        });
    }
    Ok(e / length)
}

fn basis_inverse(b: &Basis, kind: BasisKind, cfg: FitCfg) -> FitOutcome<Matrix3<f64>> {
    if !cfg.is_strict() {
        return Ok(b.inverse_or_nan());
    }
    let determinant = b.determinant();
    let singular = DegenerateGeometryError::SingularBasis {
        basis: kind,
        determinant,
    };
    if !(determinant.abs() > cfg.eps_det) {
        return Err(singular);
    }
    b.inverse().ok_or(singular)
}

/// Component-wise minimum; NaN entries are skipped.
#[inline]
fn component_min(points: &[Vec2]) -> Vec2 {
    points.iter().fold(
        Vec2::new(f64::INFINITY, f64::INFINITY),
        |m, p| Vec2::new(m.x.min(p.x), m.y.min(p.y)),
    )
}

/// Rotate the quad, then build the direct basis (origin `v[0]`, axes toward
/// `v[3]` and `v[1]`) and the diagonal basis (origin `v[2]`, same targets).
pub fn derive_bases(quad: &ClosedQuad, rotation: &Rotation, cfg: FitCfg) -> FitOutcome<Bases> {
    let rotated = quad.rotated(rotation);
    let v = rotated.points();
    let direct = Basis::new(
        unit_edge(v[0], v[3], BasisKind::Direct, 3, cfg)?,
        unit_edge(v[0], v[1], BasisKind::Direct, 1, cfg)?,
        v[0],
    );
    let diagonal = Basis::new(
        unit_edge(v[2], v[3], BasisKind::Diagonal, 3, cfg)?,
        unit_edge(v[2], v[1], BasisKind::Diagonal, 1, cfg)?,
        v[2],
    );
    Ok(Bases { direct, diagonal })
}

/// Translation that moves the reference's local minimum corner (direct-basis
/// coordinates) onto the basis origin.
///
/// The offset is measured at reference vertex 0 after the shift, so the
/// rectangle keeps its orientation while respecting the oblique axes.
pub fn fit_translation(
    reference: &ReferenceRect,
    direct: &Basis,
    cfg: FitCfg,
) -> FitOutcome<Matrix3<f64>> {
    let inv = basis_inverse(direct, BasisKind::Direct, cfg)?;
    let r = reference.points();
    let local = r.map(|p| apply(&inv, p));
    let min = component_min(&local);
    let anchored = direct.to_world(local[0] - min);
    Ok(translation_matrix(anchored - r[0]))
}

/// Largest uniform scale (about quad vertex 0) keeping the translated
/// reference inside the diagonal basis' positive quadrant.
///
/// With `c` the rotated vertex 0 and `m` the reference's minimum corner, both
/// in diagonal-basis coordinates, the per-axis limits are `c / (c - m)`; the
/// smaller one wins so neither axis overshoots.
pub fn compute_fit_scale(
    reference: &ReferenceRect,
    diagonal: &Basis,
    transition: &Matrix3<f64>,
    quad_vertex0: Vec2,
    rotation: &Rotation,
    cfg: FitCfg,
) -> FitOutcome<f64> {
    let inv = basis_inverse(diagonal, BasisKind::Diagonal, cfg)?;
    let to_local = inv * transition;
    let min = component_min(&reference.points().map(|p| apply(&to_local, p)));
    let corner = apply(&inv, rotation.apply(quad_vertex0));

    let dx = corner.x - min.x;
    let dy = corner.y - min.y;
    if cfg.is_strict() {
        for (axis, denominator) in [(Axis::X, dx), (Axis::Y, dy)] {
            if !(denominator.abs() > cfg.eps_denom) {
                return Err(DegenerateGeometryError::ScaleDenominator { axis, denominator });
            }
        }
    }
    let x_scale = corner.x / dx;
    let y_scale = corner.y / dy;
    // NaN in the x ratio wins, like a plain `b < a ? b : a`.
    Ok(if y_scale < x_scale { y_scale } else { x_scale })
}

/// Scale the translated reference about the direct-basis origin and express
/// the result as `(scale matrix, transition matrix)` acting on the untouched
/// reference.
pub fn apply_scale(
    reference: &ReferenceRect,
    direct: &Basis,
    transition: &Matrix3<f64>,
    scale: f64,
    cfg: FitCfg,
) -> FitOutcome<(Matrix3<f64>, Matrix3<f64>)> {
    let inv = basis_inverse(direct, BasisKind::Direct, cfg)?;
    let to_local = inv * transition;
    let r = reference.points();
    let scaled = r.map(|p| direct.to_world(apply(&to_local, p) * scale));

    let width = r[1].x - r[0].x;
    if cfg.is_strict() && !(width.abs() > cfg.eps_edge) {
        return Err(DegenerateGeometryError::DegenerateReference { width });
    }
    let main_scale = (scaled[1].x - scaled[0].x) / width;
    let transition = translation_matrix(scaled[0] - r[0] * main_scale);
    Ok((uniform_scale_matrix(main_scale), transition))
}

/// Full fit of `reference` into `quad` rotated by `rotation`.
pub fn fit(
    quad: &ClosedQuad,
    reference: &ReferenceRect,
    rotation: &Rotation,
    cfg: FitCfg,
) -> FitOutcome<FitResult> {
    let bases = derive_bases(quad, rotation, cfg)?;
    let transition = fit_translation(reference, &bases.direct, cfg)?;
    let fit_scale = compute_fit_scale(
        reference,
        &bases.diagonal,
        &transition,
        quad.vertex(0),
        rotation,
        cfg,
    )?;
    let (scale_matrix, transition) =
        apply_scale(reference, &bases.direct, &transition, fit_scale, cfg)?;
    let result = FitResult {
        bases,
        transition,
        scale_matrix,
        fit_scale,
        rotation: *rotation,
    };
    let t = result.translation();
    tracing::debug!(
        tx = t.x,
        ty = t.y,
        scale = result.scale(),
        fit_scale,
        angle = rotation.angle,
        "fit"
    );
    if !result.is_finite() {
        tracing::warn!(fit_scale, "fit produced non-finite values (degenerate quad?)");
    }
    Ok(result)
}

/// Every placed reference point lies in the convex hull of the rotated quad
/// (slack `eps`). `false` if the quad has no area or the fit is not finite.
pub fn reference_within_quad(
    result: &FitResult,
    quad: &ClosedQuad,
    reference: &ReferenceRect,
    eps: f64,
) -> bool {
    let Some(region) = quad.rotated(&result.rotation).region() else {
        return false;
    };
    result
        .place_reference(reference)
        .iter()
        .all(|p| region.contains_eps(*p, eps))
}
