//! Headless run of the tap-then-spin loop: four taps close a quad, then a
//! fixed-step clock drives the refit animation.
//!
//! Usage:
//!   cargo run -p quadfit --example spin_refit -- [frames]

use quadfit::prelude::*;

fn main() {
    let frames: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(120);
    let clock = ManualClock::new(0.0);
    let reference = ReferenceRect::centered(Vec2::new(187.5, 406.0), 100.0, 50.0);
    let mut animator = Animator::new(&clock, reference, AnimationCfg::default(), FitCfg::default());

    let taps = [
        Vec2::new(90.0, 300.0),
        Vec2::new(110.0, 520.0),
        Vec2::new(300.0, 540.0),
        Vec2::new(280.0, 290.0),
    ];
    for p in taps {
        match animator.tap(p) {
            Ok(Some(first)) => println!("closed: fit_scale={:.4}", first.fit_scale),
            Ok(None) => {}
            Err(e) => {
                eprintln!("fit failed: {e}");
                return;
            }
        }
    }

    for i in 0..frames {
        clock.advance(1.0 / 60.0);
        match animator.tick() {
            Ok(Some(f)) if i % 20 == 0 => {
                let t = f.fit.translation();
                println!(
                    "frame {i:4}: angle={:.2} progress={:.2} cycle={} scale={:.4} t=({:.1}, {:.1})",
                    f.angle,
                    f.progress,
                    f.cycle,
                    f.fit.scale(),
                    t.x,
                    t.y
                );
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("frame {i}: {e}");
                return;
            }
        }
    }
}
