use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use quadfit::api::{
    draw_convex_quad_retry, fit, reference_within_quad, AnimationCfg, Animator, ClosedQuad,
    FitCfg, ManualClock, QuadCfg, QuadReplay, ReferenceRect, Rotation, Vec2,
};
use serde_json::json;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod output;
mod provenance;
mod scene;

use output::{emit, fit_json, frame_json};
use provenance::{AnimationSettings, Payload};
use scene::{parse_point, parse_positive, parse_quad, Placement, Scene, DEFAULT_FRAME};

#[derive(Parser)]
#[command(name = "quadfit")]
#[command(about = "Fit a reference rectangle into a tapped quad")]
struct Cmd {
    /// Increase log verbosity (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Debug)]
struct SceneArgs {
    /// Four taps, e.g. "0,0 0,50 100,50 100,0"
    #[arg(long)]
    quad: Option<String>,
    /// JSON scene file with taps and frame; --quad overrides its taps
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Reference frame width
    #[arg(long)]
    width: Option<f64>,
    /// Reference frame height
    #[arg(long)]
    height: Option<f64>,
    /// Reference frame centre "x,y"
    #[arg(long, value_parser = parse_point, conflicts_with = "origin")]
    center: Option<Vec2>,
    /// Reference frame min corner "x,y" (default 0,0)
    #[arg(long, value_parser = parse_point)]
    origin: Option<Vec2>,
    /// Report degenerate geometry as an error instead of emitting NaN
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Action {
    /// Fit once and print the result as JSON
    Fit {
        #[command(flatten)]
        scene: SceneArgs,
        /// Rotation applied to the quad before fitting (radians)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        angle: f64,
        /// Rotation pivot "x,y" (default origin)
        #[arg(long, value_parser = parse_point)]
        pivot: Option<Vec2>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Tap the quad in, then run the spin-and-refit loop on a fixed-step clock
    Animate {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(long, default_value_t = 120)]
        frames: usize,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        /// Rotation per frame (radians)
        #[arg(long, default_value_t = AnimationCfg::default().angle_step)]
        step: f64,
        /// Progress window length (seconds, > 0)
        #[arg(
            long,
            default_value_t = AnimationCfg::default().duration,
            value_parser = parse_positive
        )]
        duration: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Draw a random convex quad and fit the reference into it
    Sample {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        /// Base radius of the sampled quad
        #[arg(long, default_value_t = 120.0)]
        radius: f64,
        #[arg(long, default_value_t = DEFAULT_FRAME.0)]
        width: f64,
        #[arg(long, default_value_t = DEFAULT_FRAME.1)]
        height: f64,
        #[arg(long)]
        strict: bool,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Fit {
            scene,
            angle,
            pivot,
            out,
        } => run_fit(scene, angle, pivot, out),
        Action::Animate {
            scene,
            frames,
            dt,
            step,
            duration,
            out,
        } => run_animate(
            scene,
            frames,
            dt,
            AnimationCfg {
                angle_step: step,
                duration,
            },
            out,
        ),
        Action::Sample {
            seed,
            index,
            radius,
            width,
            height,
            strict,
        } => run_sample(seed, index, radius, width, height, strict),
        Action::Report => report(),
    }
}

impl SceneArgs {
    fn cfg(&self) -> FitCfg {
        if self.strict {
            FitCfg::strict()
        } else {
            FitCfg::default()
        }
    }

    /// Taps and frame. Each of size and placement comes from its flag, else
    /// the scene file, else the defaults.
    fn resolve(&self) -> Result<(ClosedQuad, ReferenceRect)> {
        let file = self.scene.as_deref().map(Scene::load).transpose()?;
        let quad = match (&self.quad, &file) {
            (Some(q), _) => parse_quad(q)?,
            (None, Some(s)) => s.quad()?,
            (None, None) => anyhow::bail!("no taps: pass --quad or --scene"),
        };
        let frame = file.as_ref().and_then(|s| s.frame.as_ref());
        let width = self.width.or(frame.map(|f| f.width)).unwrap_or(DEFAULT_FRAME.0);
        let height = self.height.or(frame.map(|f| f.height)).unwrap_or(DEFAULT_FRAME.1);
        let placement = match (self.center, self.origin) {
            (Some(c), _) => Placement::Center(c),
            (None, Some(o)) => Placement::Origin(o),
            (None, None) => frame.and_then(|f| f.placement()).unwrap_or_default(),
        };
        Ok((quad, placement.rect(width, height)))
    }

    fn params(&self, quad: &ClosedQuad, reference: &ReferenceRect) -> serde_json::Value {
        json!({
            "taps": quad.distinct().iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            "frame": {
                "min": [reference.min().x, reference.min().y],
                "width": reference.width(),
                "height": reference.height(),
            },
            "scene": self.scene.as_ref().map(|p| p.display().to_string()),
        })
    }
}

fn run_fit(scene: SceneArgs, angle: f64, pivot: Option<Vec2>, out: Option<PathBuf>) -> Result<()> {
    let (quad, reference) = scene.resolve()?;
    let rotation = Rotation::about(pivot.unwrap_or_else(Vec2::zeros), angle);
    tracing::info!(angle, strict = scene.strict, "fit");
    let result = fit(&quad, &reference, &rotation, scene.cfg()).context("fitting quad")?;
    let contained = reference_within_quad(&result, &quad, &reference, 1e-6);
    let mut value = fit_json(&result, &reference);
    value["contained"] = json!(contained);
    let mut params = scene.params(&quad, &reference);
    params["angle"] = json!(angle);
    params["pivot"] = json!(pivot.map(|p| [p.x, p.y]));
    let payload = Payload::new("fit", scene.cfg(), params).with_summary(json!({
        "fit_scale": result.fit_scale,
        "finite": result.is_finite(),
        "contained": contained,
    }));
    emit(&value, out.as_deref(), &payload)
}

fn run_animate(
    scene: SceneArgs,
    frames: usize,
    dt: f64,
    anim: AnimationCfg,
    out: Option<PathBuf>,
) -> Result<()> {
    let (quad, reference) = scene.resolve()?;
    let clock = ManualClock::new(0.0);
    let mut animator = Animator::new(&clock, reference, anim, scene.cfg());
    let mut initial = None;
    for p in quad.distinct() {
        if let Some(first) = animator.tap(*p).context("closing quad")? {
            initial = Some(first);
        }
    }
    tracing::info!(frames, dt, step = anim.angle_step, "animate");
    let mut records = Vec::with_capacity(frames);
    let mut last = None;
    for i in 0..frames {
        clock.advance(dt);
        if let Some(f) = animator
            .tick()
            .with_context(|| format!("frame {i}"))?
        {
            records.push(frame_json(i, &f, &reference));
            last = Some(f);
        }
    }
    let value = json!({
        "initial": initial.map(|r| fit_json(&r, &reference)),
        "frames": records,
    });
    let payload = Payload::new("animate", scene.cfg(), scene.params(&quad, &reference))
        .with_animation(AnimationSettings::new(anim, frames, dt))
        .with_summary(json!({
            "frames": records.len(),
            "cycles": last.map(|f| f.cycle),
            "final_angle": last.map(|f| f.angle),
        }));
    emit(&value, out.as_deref(), &payload)
}

fn run_sample(seed: u64, index: u64, radius: f64, width: f64, height: f64, strict: bool) -> Result<()> {
    let cfg = QuadCfg {
        radius,
        ..QuadCfg::default()
    };
    let (quad, tok) = draw_convex_quad_retry(cfg, QuadReplay { seed, index }, 256)
        .context("no convex quad within 256 draws")?;
    let reference = ReferenceRect::centered(Vec2::zeros(), width, height);
    let fit_cfg = if strict {
        FitCfg::strict()
    } else {
        FitCfg::default()
    };
    let result = fit(&quad, &reference, &Rotation::identity(), fit_cfg).context("fitting sample")?;
    tracing::info!(seed, index = tok.index, fit_scale = result.fit_scale, "sample");
    let value = json!({
        "seed": tok.seed,
        "index": tok.index,
        "taps": quad.distinct().iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
        "contained": reference_within_quad(&result, &quad, &reference, 1e-6),
        "fit": fit_json(&result, &reference),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_rev(),
        "quadfit": quadfit::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Action {
        let mut argv = vec!["quadfit"];
        argv.extend_from_slice(args);
        Cmd::try_parse_from(argv).unwrap().action
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cmd::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cmd = Cmd::try_parse_from([
            "quadfit", "fit", "--quad", "0,0 0,100 200,100 200,0", "--center", "50,25",
        ])
        .unwrap();
        let Action::Fit { scene, .. } = cmd.action else {
            panic!("expected fit");
        };
        let (quad, reference) = scene.resolve().unwrap();
        assert_eq!(quad.vertex(2), Vec2::new(200.0, 100.0));
        assert_eq!(reference.min(), Vec2::zeros());
        assert_eq!(reference.width(), DEFAULT_FRAME.0);
    }

    #[test]
    fn missing_taps_is_an_error() {
        let cmd = Cmd::try_parse_from(["quadfit", "fit"]).unwrap();
        let Action::Fit { scene, .. } = cmd.action else {
            panic!("expected fit");
        };
        assert!(scene.resolve().is_err());
    }

    #[test]
    fn center_and_origin_conflict() {
        let r = Cmd::try_parse_from([
            "quadfit", "fit", "--quad", "0,0 0,1 1,1 1,0", "--center", "1,1", "--origin", "0,0",
        ]);
        assert!(r.is_err());
    }

    #[test]
    fn size_flag_keeps_scene_placement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(
            &path,
            r#"{"taps": [[0,0],[0,100],[200,100],[200,0]],
                "frame": {"width": 100, "height": 50, "center": [300, 400]}}"#,
        )
        .unwrap();
        let scene_arg = path.to_str().unwrap();
        let Action::Fit { scene, .. } = parse(&["fit", "--scene", scene_arg, "--width", "200"])
        else {
            panic!("expected fit");
        };
        let (_, reference) = scene.resolve().unwrap();
        assert_eq!(reference.width(), 200.0);
        assert_eq!(reference.height(), 50.0);
        assert_eq!(reference.min(), Vec2::new(200.0, 375.0));

        // A placement flag replaces the file's placement but keeps its size.
        let Action::Fit { scene, .. } = parse(&["fit", "--scene", scene_arg, "--origin", "1,2"])
        else {
            panic!("expected fit");
        };
        let (_, reference) = scene.resolve().unwrap();
        assert_eq!(reference.min(), Vec2::new(1.0, 2.0));
        assert_eq!(reference.width(), 100.0);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        for d in ["0", "-0.5"] {
            let r = Cmd::try_parse_from([
                "quadfit", "animate", "--quad", "0,0 0,1 1,1 1,0", "--duration", d,
            ]);
            assert!(r.is_err(), "duration {d} accepted");
        }
    }

    #[test]
    fn fit_writes_result_and_sidecar() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("fit.json");
        let Action::Fit {
            scene,
            angle,
            pivot,
            out,
        } = parse(&[
            "fit",
            "--quad",
            "0,0 0,100 200,100 200,0",
            "--strict",
            "--out",
            out.to_str().unwrap(),
        ])
        else {
            panic!("expected fit");
        };
        let out = out.unwrap();
        run_fit(scene, angle, pivot, Some(out.clone())).unwrap();
        let v = read_json(&out);
        assert!((v["fit_scale"].as_f64().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(v["contained"], true);
        let prov = read_json(&out.with_file_name("fit.provenance.json"));
        assert_eq!(prov["command"], "fit");
        assert_eq!(prov["fit"]["strict"], true);
        assert_eq!(prov["summary"]["contained"], true);
        assert_eq!(prov["params"]["taps"][2], serde_json::json!([200.0, 100.0]));
    }

    #[test]
    fn animate_emits_every_frame_and_rolls_cycles() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("spin.json");
        let Action::Animate {
            scene,
            frames,
            dt,
            step,
            duration,
            out,
        } = parse(&[
            "animate",
            "--quad",
            "0,0 0,100 200,100 200,0",
            "--frames",
            "6",
            "--dt",
            "0.25",
            "--duration",
            "0.6",
            "--out",
            out.to_str().unwrap(),
        ])
        else {
            panic!("expected animate");
        };
        let anim = AnimationCfg {
            angle_step: step,
            duration,
        };
        let out = out.unwrap();
        run_animate(scene, frames, dt, anim, Some(out.clone())).unwrap();
        let v = read_json(&out);
        assert!((v["initial"]["fit_scale"].as_f64().unwrap() - 2.0).abs() < 1e-12);
        let records = v["frames"].as_array().unwrap();
        assert_eq!(records.len(), 6);
        // Elapsed 0.25, 0.5 | 0.75 restarts | 1.0, 1.25 | 1.5 restarts.
        let cycles: Vec<u64> = records.iter().map(|r| r["cycle"].as_u64().unwrap()).collect();
        assert_eq!(cycles, [0, 0, 1, 1, 1, 2]);
        assert_eq!(records[2]["progress"], 0.0);
        let last_angle = records[5]["angle"].as_f64().unwrap();
        assert!((last_angle - 0.06).abs() < 1e-12);

        let prov = read_json(&out.with_file_name("spin.provenance.json"));
        assert_eq!(prov["command"], "animate");
        assert_eq!(prov["animation"]["frames"], 6);
        assert_eq!(prov["animation"]["duration"], 0.6);
        assert_eq!(prov["summary"]["cycles"], 2);
    }
}
