//! Spin-and-refit animation as an explicit state machine.
//!
//! States
//! - `Idle`: fewer than four taps collected (or a stray tap just cleared the quad).
//! - `Fitting`: a quad is closed; every `tick` advances the rotation by a fixed
//!   step and refits. When the progress window passes 1 it restarts, so the
//!   animation loops until the next tap.
//!
//! Time comes from an injected [`Clock`]; tests drive it with [`ManualClock`].

use std::cell::Cell;
use std::time::Instant;

use crate::error::DegenerateGeometryError;
use crate::fit::{fit, FitResult};
use crate::geom2::{ClosedQuad, FitCfg, ReferenceRect, Rotation, TapOutcome, TapSequence, Vec2};

/// Monotonic time source in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock, seconds since construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Deterministic clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    t: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { t: Cell::new(start) }
    }
    pub fn advance(&self, dt: f64) {
        self.t.set(self.t.get() + dt);
    }
    pub fn set(&self, t: f64) {
        self.t.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.t.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Animation parameters.
#[derive(Clone, Copy, Debug)]
pub struct AnimationCfg {
    /// Rotation added per tick (radians).
    pub angle_step: f64,
    /// Length of one progress window (seconds). Must be positive: zero or a
    /// negative value makes every tick report NaN or infinite progress.
    pub duration: f64,
}

impl Default for AnimationCfg {
    fn default() -> Self {
        Self {
            angle_step: 0.01,
            duration: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Fitting {
        quad: ClosedQuad,
        rotation: Rotation,
        started_at: f64,
        /// Completed progress windows.
        cycle: u64,
        last: FitResult,
    },
}

impl Phase {
    #[inline]
    pub fn is_fitting(&self) -> bool {
        matches!(self, Phase::Fitting { .. })
    }
}

/// One animation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub fit: FitResult,
    pub angle: f64,
    /// Position in the current window, in [0, 1].
    pub progress: f64,
    pub cycle: u64,
}

/// Owns the tap sequence, the reference rectangle and the animation phase.
#[derive(Debug)]
pub struct Animator<C: Clock> {
    clock: C,
    cfg: AnimationCfg,
    fit_cfg: FitCfg,
    reference: ReferenceRect,
    taps: TapSequence,
    phase: Phase,
}

impl<C: Clock> Animator<C> {
    pub fn new(clock: C, reference: ReferenceRect, cfg: AnimationCfg, fit_cfg: FitCfg) -> Self {
        Self {
            clock,
            cfg,
            fit_cfg,
            reference,
            taps: TapSequence::new(),
            phase: Phase::Idle,
        }
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    #[inline]
    pub fn taps(&self) -> &TapSequence {
        &self.taps
    }
    #[inline]
    pub fn reference(&self) -> &ReferenceRect {
        &self.reference
    }
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn last_fit(&self) -> Option<&FitResult> {
        match &self.phase {
            Phase::Fitting { last, .. } => Some(last),
            Phase::Idle => None,
        }
    }

    /// Feed one tap. Returns the initial fit when this tap closed a quad.
    ///
    /// On a fit error the quad stays closed but the animator remains `Idle`.
    pub fn tap(&mut self, p: Vec2) -> Result<Option<FitResult>, DegenerateGeometryError> {
        match self.taps.push(p) {
            TapOutcome::Pending(n) => {
                tracing::trace!(taps = n, "tap");
                Ok(None)
            }
            TapOutcome::Restarted => {
                if self.phase.is_fitting() {
                    tracing::info!("stray tap: quad cleared, back to idle");
                }
                self.phase = Phase::Idle;
                Ok(None)
            }
            TapOutcome::Closed(quad) => {
                let rotation = Rotation::identity();
                let last = fit(&quad, &self.reference, &rotation, self.fit_cfg)?;
                let started_at = self.clock.now();
                tracing::info!(started_at, fit_scale = last.fit_scale, "quad closed, fitting");
                self.phase = Phase::Fitting {
                    quad,
                    rotation,
                    started_at,
                    cycle: 0,
                    last,
                };
                Ok(Some(last))
            }
        }
    }

    /// Advance one frame. `None` while idle.
    pub fn tick(&mut self) -> Result<Option<Frame>, DegenerateGeometryError> {
        let now = self.clock.now();
        let Phase::Fitting {
            quad,
            rotation,
            started_at,
            cycle,
            last,
        } = &mut self.phase
        else {
            return Ok(None);
        };
        let next = rotation.advanced(self.cfg.angle_step);
        let result = fit(quad, &self.reference, &next, self.fit_cfg)?;
        *rotation = next;
        *last = result;

        let mut progress = (now - *started_at) / self.cfg.duration;
        if progress > 1.0 {
            *started_at = now;
            *cycle += 1;
            progress = 0.0;
            tracing::debug!(cycle = *cycle, angle = next.angle, "animation window restarted");
        }
        tracing::trace!(angle = next.angle, progress, "tick");
        Ok(Some(Frame {
            fit: result,
            angle: next.angle,
            progress,
            cycle: *cycle,
        }))
    }

    /// Drop any quad and pending taps.
    pub fn reset(&mut self) {
        self.taps.clear();
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn animator(clock: &ManualClock) -> Animator<&ManualClock> {
        Animator::new(
            clock,
            ReferenceRect::from_min_size(Vec2::zeros(), 100.0, 50.0),
            AnimationCfg::default(),
            FitCfg::strict(),
        )
    }

    fn tap_rect(a: &mut Animator<&ManualClock>) -> Option<FitResult> {
        assert!(a.tap(vector![0.0, 0.0]).unwrap().is_none());
        assert!(a.tap(vector![0.0, 100.0]).unwrap().is_none());
        assert!(a.tap(vector![200.0, 100.0]).unwrap().is_none());
        a.tap(vector![200.0, 0.0]).unwrap()
    }

    #[test]
    fn idle_until_fourth_tap() {
        let clock = ManualClock::new(0.0);
        let mut a = animator(&clock);
        assert!(a.tick().unwrap().is_none());
        a.tap(vector![0.0, 0.0]).unwrap();
        assert_eq!(a.phase(), &Phase::Idle);
        assert!(a.tick().unwrap().is_none());
        assert_eq!(a.taps().pending().len(), 1);
    }

    #[test]
    fn fourth_tap_fits_and_starts_clock() {
        let clock = ManualClock::new(5.0);
        let mut a = animator(&clock);
        let first = tap_rect(&mut a).expect("initial fit");
        assert!((first.fit_scale - 2.0).abs() < 1e-12);
        match a.phase() {
            Phase::Fitting {
                started_at,
                cycle,
                rotation,
                ..
            } => {
                assert_eq!(*started_at, 5.0);
                assert_eq!(*cycle, 0);
                assert_eq!(rotation.angle, 0.0);
            }
            Phase::Idle => panic!("expected fitting"),
        }
        assert_eq!(a.last_fit(), Some(&first));
    }

    #[test]
    fn ticks_advance_angle_and_loop_window() {
        let clock = ManualClock::new(0.0);
        let mut a = animator(&clock);
        tap_rect(&mut a);
        let mut last_angle = 0.0;
        for k in 1..=4 {
            clock.advance(0.25);
            let f = a.tick().unwrap().expect("frame");
            assert!((f.angle - 0.01 * k as f64).abs() < 1e-12);
            assert!(f.angle > last_angle);
            last_angle = f.angle;
            assert!((f.progress - 0.25 * k as f64).abs() < 1e-12);
            assert_eq!(f.cycle, 0);
        }
        // Past the window: restart, never go idle.
        clock.advance(0.5);
        let f = a.tick().unwrap().unwrap();
        assert_eq!(f.cycle, 1);
        assert_eq!(f.progress, 0.0);
        assert!(a.phase().is_fitting());
        clock.advance(0.5);
        let f = a.tick().unwrap().unwrap();
        assert!((f.progress - 0.5).abs() < 1e-12);
        assert!((f.angle - 0.06).abs() < 1e-12);
        assert_eq!(a.last_fit(), Some(&f.fit));
        assert!((f.fit.rotation.angle - f.angle).abs() < 1e-15);
    }

    #[test]
    fn stray_tap_returns_to_idle_and_starts_new_sequence() {
        let clock = ManualClock::new(0.0);
        let mut a = animator(&clock);
        tap_rect(&mut a);
        a.tick().unwrap();
        assert!(a.tap(vector![9.0, 9.0]).unwrap().is_none());
        assert_eq!(a.phase(), &Phase::Idle);
        assert!(a.tick().unwrap().is_none());
        assert_eq!(a.taps().pending(), &[vector![9.0, 9.0]]);
        // Three more taps close a fresh quad with the rotation reset.
        a.tap(vector![9.0, 109.0]).unwrap();
        a.tap(vector![209.0, 109.0]).unwrap();
        let fit = a.tap(vector![209.0, 9.0]).unwrap().expect("refit");
        assert_eq!(fit.rotation.angle, 0.0);
        assert!((fit.fit_scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_quad_is_reported_in_strict_mode() {
        let clock = ManualClock::new(0.0);
        let mut a = animator(&clock);
        for _ in 0..3 {
            a.tap(vector![1.0, 1.0]).unwrap();
        }
        let err = a.tap(vector![1.0, 1.0]).unwrap_err();
        assert!(matches!(err, DegenerateGeometryError::ZeroLengthEdge { .. }));
        assert_eq!(a.phase(), &Phase::Idle);
    }

    #[test]
    fn reset_clears_everything() {
        let clock = ManualClock::new(0.0);
        let mut a = animator(&clock);
        tap_rect(&mut a);
        a.reset();
        assert_eq!(a.phase(), &Phase::Idle);
        assert!(a.taps().closed().is_none());
        assert!(a.taps().pending().is_empty());
    }

    #[test]
    fn zero_duration_keeps_refitting_but_progress_is_not_finite() {
        let clock = ManualClock::new(0.0);
        let mut a = Animator::new(
            &clock,
            ReferenceRect::from_min_size(Vec2::zeros(), 100.0, 50.0),
            AnimationCfg {
                angle_step: 0.01,
                duration: 0.0,
            },
            FitCfg::strict(),
        );
        tap_rect(&mut a);
        // Same instant: 0 / 0.
        let f = a.tick().unwrap().unwrap();
        assert!(f.progress.is_nan());
        assert!(f.fit.is_finite());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let c = SystemClock::new();
        let a = c.now();
        let b = c.now();
        assert!(b >= a && a >= 0.0);
    }
}
