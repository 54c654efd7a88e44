//! Random convex quads (radial jitter + replay tokens).
//!
//! Purpose
//! - Deterministic sampler for tap-like quads, used by benches, property
//!   checks and the CLI `sample` command.
//!
//! Model
//! - Start from 4 equally spaced angles on [0, 2π), add bounded angular and
//!   radial jitter, place the corners around `center`, and keep the draw only
//!   if the result is strictly convex.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::quad::ClosedQuad;
use super::types::Vec2;

/// Radial-jitter sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct QuadCfg {
    /// Angular jitter as a fraction of the base spacing π/2. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radial jitter (relative amplitude). Radii = `radius * (1 + u)`, with `u∈[-radial_jitter, radial_jitter]`.
    pub radial_jitter: f64,
    /// Base radius in view units.
    pub radius: f64,
    /// Random global phase in [0, 2π)?
    pub random_phase: bool,
    pub center: Vec2,
}
impl Default for QuadCfg {
    fn default() -> Self {
        Self {
            angle_jitter_frac: 0.3,
            radial_jitter: 0.25,
            radius: 120.0,
            random_phase: true,
            center: Vec2::zeros(),
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
    #[inline]
    pub fn next(self) -> Self {
        Self {
            seed: self.seed,
            index: self.index.wrapping_add(1),
        }
    }
}

/// Draw a random quad, corners in counter-clockwise tap order.
///
/// Returns `None` when the jittered corners are not strictly convex; callers
/// wanting a quad regardless step the token with [`ReplayToken::next`].
pub fn draw_convex_quad(cfg: QuadCfg, tok: ReplayToken) -> Option<ClosedQuad> {
    let mut rng = tok.to_std_rng();
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.99);
    let r0 = cfg.radius.max(1e-9);
    let delta = std::f64::consts::FRAC_PI_2;
    let phase = if cfg.random_phase {
        rng.gen::<f64>() * std::f64::consts::TAU
    } else {
        0.0
    };
    let mut corners = [Vec2::zeros(); 4];
    for (k, corner) in corners.iter_mut().enumerate() {
        let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
        let th = phase + (k as f64) * delta + jitter;
        let u = (rng.gen::<f64>() * 2.0 - 1.0) * rj;
        let r = (1.0 + u) * r0;
        *corner = cfg.center + Vec2::new(th.cos() * r, th.sin() * r);
    }
    let quad = ClosedQuad::from_taps(corners);
    quad.is_strictly_convex().then_some(quad)
}

/// First convex draw at or after `tok`, trying at most `max_attempts` tokens.
pub fn draw_convex_quad_retry(
    cfg: QuadCfg,
    tok: ReplayToken,
    max_attempts: usize,
) -> Option<(ClosedQuad, ReplayToken)> {
    let mut t = tok;
    for _ in 0..max_attempts {
        if let Some(q) = draw_convex_quad(cfg, t) {
            return Some((q, t));
        }
        t = t.next();
    }
    None
}
