//! JSON views of fit results and the stdout/file sink.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quadfit::api::{Basis, FitResult, Frame, ReferenceRect, Vec2};
use quadfit::Mat3;
use serde_json::{json, Value};

use crate::provenance::{write_sidecar, Payload};

fn point(p: Vec2) -> Value {
    json!([p.x, p.y])
}

fn matrix(m: &Mat3) -> Value {
    json!([
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]]
    ])
}

fn basis(b: &Basis) -> Value {
    json!({
        "x_axis": point(b.x_axis()),
        "y_axis": point(b.y_axis()),
        "origin": point(b.origin()),
    })
}

/// Non-finite numbers serialize as `null`.
pub fn fit_json(r: &FitResult, reference: &ReferenceRect) -> Value {
    let placed: Vec<Value> = r.place_reference(reference).iter().map(|p| point(*p)).collect();
    json!({
        "fit_scale": r.fit_scale,
        "scale": r.scale(),
        "translation": point(r.translation()),
        "angle": r.rotation.angle,
        "direct_basis": basis(&r.bases.direct),
        "diagonal_basis": basis(&r.bases.diagonal),
        "reference_transform": matrix(&r.reference_transform()),
        "snap_transform": r.snap_transform().map(|m| matrix(&m)),
        "placed_reference": placed,
        "finite": r.is_finite(),
    })
}

pub fn frame_json(index: usize, f: &Frame, reference: &ReferenceRect) -> Value {
    json!({
        "frame": index,
        "angle": f.angle,
        "progress": f.progress,
        "cycle": f.cycle,
        "fit": fit_json(&f.fit, reference),
    })
}

/// Print `value` to stdout; with `out`, also write it there plus a provenance sidecar.
pub fn emit(value: &Value, out: Option<&Path>, payload: &Payload) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating output dir {}", parent.display()))?;
            }
        }
        fs::write(out, text.as_bytes()).with_context(|| format!("writing {}", out.display()))?;
        let prov = write_sidecar(out, payload)?;
        tracing::info!(out = %out.display(), provenance = %prov.display(), "wrote output");
    }
    Ok(())
}
