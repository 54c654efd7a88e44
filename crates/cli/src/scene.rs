//! Scene input: taps and the reference frame, from flags or a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quadfit::api::{ClosedQuad, ReferenceRect, Vec2};
use serde::{Deserialize, Serialize};

/// Host-view frame size used when nothing else is given.
pub const DEFAULT_FRAME: (f64, f64) = (100.0, 50.0);

/// JSON scene: `{ "taps": [[x,y], ...], "frame": { ... } }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scene {
    /// Four taps, or five with the first repeated.
    pub taps: Vec<[f64; 2]>,
    #[serde(default)]
    pub frame: Option<FrameSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrameSpec {
    pub width: f64,
    pub height: f64,
    /// Frame centre; wins over `origin` when both are set.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    /// Min corner.
    #[serde(default)]
    pub origin: Option<[f64; 2]>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn quad(&self) -> Result<ClosedQuad> {
        let pts: Vec<Vec2> = self.taps.iter().map(|p| Vec2::new(p[0], p[1])).collect();
        quad_from_points(&pts)
    }
}

/// Where the reference frame sits; size is merged separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Center(Vec2),
    Origin(Vec2),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Origin(Vec2::zeros())
    }
}

impl Placement {
    pub fn rect(self, width: f64, height: f64) -> ReferenceRect {
        match self {
            Placement::Center(c) => ReferenceRect::centered(c, width, height),
            Placement::Origin(o) => ReferenceRect::from_min_size(o, width, height),
        }
    }
}

impl FrameSpec {
    /// `None` when the file leaves placement open.
    pub fn placement(&self) -> Option<Placement> {
        match (self.center, self.origin) {
            (Some(c), _) => Some(Placement::Center(Vec2::new(c[0], c[1]))),
            (None, Some(o)) => Some(Placement::Origin(Vec2::new(o[0], o[1]))),
            (None, None) => None,
        }
    }

    pub fn reference(&self) -> ReferenceRect {
        self.placement()
            .unwrap_or_default()
            .rect(self.width, self.height)
    }
}

/// Four taps are closed automatically; five must already be closed.
pub fn quad_from_points(pts: &[Vec2]) -> Result<ClosedQuad> {
    match pts.len() {
        4 => Ok(ClosedQuad::from_taps([pts[0], pts[1], pts[2], pts[3]])),
        _ => Ok(ClosedQuad::try_from_closed(pts)?),
    }
}

/// `"x,y"` → point (clap value parser).
pub fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in {s:?}: {e}"))?;
    Ok(Vec2::new(x, y))
}

/// Strictly positive finite number (clap value parser for durations).
pub fn parse_positive(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("bad number {s:?}: {e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("must be positive, got {v}"))
    }
}

/// `"x,y x,y x,y x,y"` (whitespace or `;` separated) → closed quad.
pub fn parse_quad(s: &str) -> Result<ClosedQuad> {
    let pts = s
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|t| !t.is_empty())
        .map(|t| parse_point(t).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    if pts.len() != 4 && pts.len() != 5 {
        bail!("expected 4 taps, got {}", pts.len());
    }
    quad_from_points(&pts)
}
