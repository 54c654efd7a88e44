//! Closed point sequences: the tapped quad, the reference rectangle, and the
//! tap collector that produces quads.
//!
//! Both polygon types store 5 points with the first repeated at the end. The
//! constructors enforce that, so callers never duplicate the closing point.

use crate::error::QuadError;

use super::hull::ConvexRegion;
use super::types::{Rotation, Vec2};

/// Number of stored points (4 corners + closing repeat).
pub const CLOSED_LEN: usize = 5;

/// Quadrilateral in tap order, closed: `points[4] == points[0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosedQuad {
    pts: [Vec2; CLOSED_LEN],
}

impl ClosedQuad {
    /// Close four taps into a quad.
    pub fn from_taps(taps: [Vec2; 4]) -> Self {
        Self {
            pts: [taps[0], taps[1], taps[2], taps[3], taps[0]],
        }
    }

    /// Accept an already-closed 5-point sequence.
    pub fn try_from_closed(points: &[Vec2]) -> Result<Self, QuadError> {
        if points.len() != CLOSED_LEN {
            return Err(QuadError::WrongVertexCount(points.len()));
        }
        if points[0] != points[4] {
            return Err(QuadError::NotClosed);
        }
        Ok(Self::from_taps([points[0], points[1], points[2], points[3]]))
    }

    #[inline]
    pub fn points(&self) -> &[Vec2; CLOSED_LEN] {
        &self.pts
    }

    /// Vertex `i` in `0..5`; index 4 is the closing repeat of 0.
    #[inline]
    pub fn vertex(&self, i: usize) -> Vec2 {
        self.pts[i]
    }

    /// The four corners without the closing repeat.
    #[inline]
    pub fn distinct(&self) -> &[Vec2] {
        &self.pts[..4]
    }

    pub fn centroid(&self) -> Vec2 {
        self.distinct().iter().sum::<Vec2>() / 4.0
    }

    pub fn rotated(&self, rotation: &Rotation) -> Self {
        let m = rotation.matrix();
        Self {
            pts: self.pts.map(|p| super::types::apply(&m, p)),
        }
    }

    /// All four turns have the same non-zero orientation.
    pub fn is_strictly_convex(&self) -> bool {
        let c = self.distinct();
        let mut sign = 0.0_f64;
        for k in 0..4 {
            let a = c[k];
            let b = c[(k + 1) % 4];
            let d = c[(k + 2) % 4];
            let turn = crate::parallelogram_area(b - a, d - b);
            if !turn.is_finite() || turn == 0.0 {
                return false;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Half-plane form of the corners' convex hull.
    pub fn region(&self) -> Option<ConvexRegion> {
        ConvexRegion::from_points(self.distinct())
    }
}

impl TryFrom<&[Vec2]> for ClosedQuad {
    type Error = QuadError;
    fn try_from(points: &[Vec2]) -> Result<Self, Self::Error> {
        Self::try_from_closed(points)
    }
}

/// Axis-aligned rectangle: (min,min) (max,min) (max,max) (min,max) (min,min).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceRect {
    pts: [Vec2; CLOSED_LEN],
}

impl ReferenceRect {
    pub fn from_min_size(min: Vec2, width: f64, height: f64) -> Self {
        let max = min + Vec2::new(width, height);
        Self {
            pts: [
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
                min,
            ],
        }
    }

    /// Rectangle of the given size centred on `center` (how the host view
    /// places its frame on the viewport).
    pub fn centered(center: Vec2, width: f64, height: f64) -> Self {
        Self::from_min_size(center - Vec2::new(width, height) * 0.5, width, height)
    }

    #[inline]
    pub fn points(&self) -> &[Vec2; CLOSED_LEN] {
        &self.pts
    }
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pts[0]
    }
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pts[2]
    }
    #[inline]
    pub fn width(&self) -> f64 {
        self.pts[1].x - self.pts[0].x
    }
    #[inline]
    pub fn height(&self) -> f64 {
        self.pts[3].y - self.pts[0].y
    }
}

/// Result of feeding one tap into a [`TapSequence`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TapOutcome {
    /// Sequence still open; holds this many taps.
    Pending(usize),
    /// Fourth tap closed the quad.
    Closed(ClosedQuad),
    /// A tap arrived after the quad was closed: the quad was dropped and a
    /// new sequence started with this tap.
    Restarted,
}

/// Collects taps four at a time.
#[derive(Clone, Debug, Default)]
pub struct TapSequence {
    open: Vec<Vec2>,
    closed: Option<ClosedQuad>,
}

impl TapSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, p: Vec2) -> TapOutcome {
        if self.closed.take().is_some() {
            self.open.clear();
            self.open.push(p);
            return TapOutcome::Restarted;
        }
        self.open.push(p);
        if self.open.len() < 4 {
            return TapOutcome::Pending(self.open.len());
        }
        let quad = ClosedQuad::from_taps([self.open[0], self.open[1], self.open[2], self.open[3]]);
        self.open.clear();
        self.closed = Some(quad);
        TapOutcome::Closed(quad)
    }

    /// Taps of the open sequence (empty once closed).
    #[inline]
    pub fn pending(&self) -> &[Vec2] {
        &self.open
    }

    #[inline]
    pub fn closed(&self) -> Option<&ClosedQuad> {
        self.closed.as_ref()
    }

    pub fn clear(&mut self) {
        self.open.clear();
        self.closed = None;
    }
}
