//! Provenance sidecars: every `--out` artifact gets `<stem>.provenance.json`
//! recording the code revision, the fit settings that produced it and a short
//! summary of what it contains.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use quadfit::api::{AnimationCfg, FitCfg};
use serde::Serialize;
use serde_json::Value;

/// Validation mode and tolerances of the run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FitSettings {
    pub strict: bool,
    pub eps_edge: f64,
    pub eps_det: f64,
    pub eps_denom: f64,
}

impl From<FitCfg> for FitSettings {
    fn from(cfg: FitCfg) -> Self {
        Self {
            strict: cfg.is_strict(),
            eps_edge: cfg.eps_edge,
            eps_det: cfg.eps_det,
            eps_denom: cfg.eps_denom,
        }
    }
}

/// Clock and step settings of an `animate` run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnimationSettings {
    pub frames: usize,
    pub dt: f64,
    pub angle_step: f64,
    pub duration: f64,
}

impl AnimationSettings {
    pub fn new(cfg: AnimationCfg, frames: usize, dt: f64) -> Self {
        Self {
            frames,
            dt,
            angle_step: cfg.angle_step,
            duration: cfg.duration,
        }
    }
}

/// What the CLI knows about one run.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub command: &'static str,
    pub fit: FitSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSettings>,
    /// Taps, frame and per-command inputs.
    pub params: Value,
    /// Headline numbers of the artifact (fit scale, cycles reached, ...).
    pub summary: Value,
}

impl Payload {
    pub fn new(command: &'static str, cfg: FitCfg, params: Value) -> Self {
        Self {
            command,
            fit: cfg.into(),
            animation: None,
            params,
            summary: Value::Null,
        }
    }

    pub fn with_animation(mut self, animation: AnimationSettings) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_summary(mut self, summary: Value) -> Self {
        self.summary = summary;
        self
    }
}

#[derive(Serialize)]
struct Record<'a> {
    code_rev: String,
    quadfit: &'static str,
    output: String,
    #[serde(flatten)]
    payload: &'a Payload,
}

/// Sidecar next to `artifact`: `fit.json` → `fit.provenance.json`.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

pub fn write_sidecar(artifact: &Path, payload: &Payload) -> Result<PathBuf> {
    let path = sidecar_path(artifact);
    let record = Record {
        code_rev: code_rev(),
        quadfit: quadfit::VERSION,
        output: artifact.display().to_string(),
        payload,
    };
    fs::write(&path, serde_json::to_vec_pretty(&record)?)
        .with_context(|| format!("writing provenance {}", path.display()))?;
    Ok(path)
}

/// `GIT_COMMIT` (runtime, then build time), else `git rev-parse`, else "unknown".
pub fn code_rev() -> String {
    std::env::var("GIT_COMMIT")
        .ok()
        .or_else(|| option_env!("GIT_COMMIT").map(str::to_owned))
        .filter(|s| !s.is_empty())
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn git_head() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_owned())
}
