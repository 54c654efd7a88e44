//! Convex hull and half-plane containment, used to check that a fitted
//! rectangle stays inside its quad.

use nalgebra::Vector2;

/// Closed half-plane `n · x <= c` with unit `n`.
#[derive(Clone, Copy, Debug)]
pub struct HalfPlane {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl HalfPlane {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }
    #[inline]
    pub fn satisfies_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        self.n.dot(&p) <= self.c + eps
    }
}

#[inline]
fn canonicalize_unit(n: Vector2<f64>, c: f64) -> Option<(Vector2<f64>, f64)> {
    let norm = n.norm();
    if !(norm.is_finite()) || norm <= 0.0 {
        return None;
    }
    Some((n / norm, c / norm))
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    (b - a).perp(&(c - a))
}

/// Andrew's monotone chain convex hull (CCW, no repeated endpoint).
pub fn convex_hull(points: &[Vector2<f64>]) -> Option<Vec<Vector2<f64>>> {
    if points.len() < 3 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }
    let mut pts: Vec<_> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
    if pts.len() < 3 {
        return None;
    }
    let mut lower: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() < 3 {
        return None;
    }
    Some(hull)
}

/// Bounded convex region as an intersection of half-planes.
#[derive(Clone, Debug, Default)]
pub struct ConvexRegion {
    pub hs: Vec<HalfPlane>,
}

impl ConvexRegion {
    /// Hull of `points` with outward unit normals; `None` for fewer than three
    /// non-collinear finite points.
    pub fn from_points(points: &[Vector2<f64>]) -> Option<Self> {
        let hull = convex_hull(points)?;
        let mut hs = Vec::with_capacity(hull.len());
        for k in 0..hull.len() {
            let p = hull[k];
            let q = hull[(k + 1) % hull.len()];
            let edge = q - p;
            // CCW order: outward normal is the edge turned 90° clockwise.
            let n = Vector2::new(edge.y, -edge.x);
            if let Some((nn, cc)) = canonicalize_unit(n, n.dot(&p)) {
                hs.push(HalfPlane::new(nn, cc));
            }
        }
        Some(Self { hs })
    }

    /// Membership with slack: `eps > 0` enlarges the region, `eps < 0` shrinks it.
    #[inline]
    pub fn contains_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        !self.hs.is_empty() && self.hs.iter().all(|h| h.satisfies_eps(p, eps))
    }
}
