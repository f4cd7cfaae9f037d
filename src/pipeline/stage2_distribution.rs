use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use thiserror::Error;

use crate::model::{Cohort, ScoreRecord, Trait};
use crate::scratch::{ArtifactKey, ArtifactSet, ScratchDir};

/// Fixed x-range of every plot, independent of the data.
pub const DOMAIN_MIN: f64 = 1.0;
pub const DOMAIN_MAX: f64 = 5.0;
pub const HIST_BINS: usize = 26;
/// 14 x 8 inches at 100 dpi; same aspect as the image slot in the report.
pub const FIGURE_SIZE: (u32, u32) = (1400, 800);
pub const KDE_SAMPLES: usize = 200;
/// Used when the cohort has fewer than two members or no spread.
pub const MIN_BANDWIDTH: f64 = 0.1;

/// Family every chart label is drawn with; backed by the bundled DejaVu Sans.
pub const CHART_FONT_FAMILY: &str = "sans-serif";
static CHART_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw {path}: {message}")]
    Draw { path: String, message: String },
    #[error("failed to load chart font: {message}")]
    Font { message: String },
}

/// Registers the bundled font with plotters once per process. Tick labels and
/// axis descriptions cannot be drawn without it.
pub fn ensure_chart_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(CHART_FONT_FAMILY, FontStyle::Normal, CHART_FONT)
                .map_err(|_| "InvalidFont".to_string())
        })
        .clone()
        .map_err(|message| RenderError::Font { message })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistBin {
    pub lo: f64,
    pub hi: f64,
    pub density: f64,
}

/// Density-normalized histogram over the data range. A constant sample gets
/// a unit-wide range centred on the value.
pub fn histogram_density(values: &[f64], bins: usize) -> Vec<HistBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let norm = values.len() as f64 * width;
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| HistBin {
            lo: lo + i as f64 * width,
            hi: lo + (i + 1) as f64 * width,
            density: c as f64 / norm,
        })
        .collect()
}

/// Scott's rule: sample standard deviation times n^(-1/5).
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return MIN_BANDWIDTH;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64;
    let bw = var.sqrt() * (n as f64).powf(-0.2);
    if bw.is_finite() && bw > 0.0 {
        bw
    } else {
        MIN_BANDWIDTH
    }
}

/// Gaussian kernel density sampled evenly over `[x_min, x_max]`.
pub fn kde_curve(
    values: &[f64],
    bandwidth: f64,
    x_min: f64,
    x_max: f64,
    samples: usize,
) -> Vec<(f64, f64)> {
    if values.is_empty() || samples < 2 {
        return Vec::new();
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (x_max - x_min) / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let x = x_min + i as f64 * step;
            let sum: f64 = values
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}

/// Draws the cohort distribution for one trait with a marker at `marker`.
pub fn render_distribution(
    path: &Path,
    t: Trait,
    cohort: &[f64],
    marker: f64,
) -> Result<(), RenderError> {
    ensure_chart_font()?;
    let draw_err = |e: &dyn std::fmt::Display| RenderError::Draw {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let bins = histogram_density(cohort, HIST_BINS);
    let curve = kde_curve(
        cohort,
        scott_bandwidth(cohort),
        DOMAIN_MIN,
        DOMAIN_MAX,
        KDE_SAMPLES,
    );

    let peak = bins
        .iter()
        .map(|b| b.density)
        .chain(curve.iter().map(|&(_, y)| y))
        .fold(0.0f64, f64::max);
    let y_max = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(DOMAIN_MIN..DOMAIN_MAX, 0.0..y_max)
        .map_err(|e| draw_err(&e))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(9)
        .x_desc(t.column())
        .y_desc("Density")
        .label_style((CHART_FONT_FAMILY, 18))
        .axis_desc_style((CHART_FONT_FAMILY, 22))
        .draw()
        .map_err(|e| draw_err(&e))?;

    // Bins outside the fixed domain are clipped to it.
    let visible = bins
        .iter()
        .filter(|b| b.hi > DOMAIN_MIN && b.lo < DOMAIN_MAX && b.density > 0.0)
        .map(|b| {
            Rectangle::new(
                [
                    (b.lo.max(DOMAIN_MIN), 0.0),
                    (b.hi.min(DOMAIN_MAX), b.density),
                ],
                BLUE.mix(0.4).filled(),
            )
        });
    chart.draw_series(visible).map_err(|e| draw_err(&e))?;

    chart
        .draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))
        .map_err(|e| draw_err(&e))?;

    if (DOMAIN_MIN..=DOMAIN_MAX).contains(&marker) {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(marker, 0.0), (marker, y_max)],
                RED.stroke_width(2),
            )))
            .map_err(|e| draw_err(&e))?;
    } else {
        tracing::warn!(
            path = %path.display(),
            t = t.name(),
            score = marker,
            "score lies outside the plotted range; marker omitted"
        );
    }

    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}

/// Renders all five artifacts for one individual into scratch storage. Each
/// path is registered before drawing so a partial file is still reclaimed.
pub fn render_individual(
    scratch: &ScratchDir,
    cohort: &Cohort,
    index: usize,
    record: &ScoreRecord,
) -> Result<ArtifactSet, RenderError> {
    let mut artifacts = scratch.begin_individual();
    for t in Trait::ALL {
        let key = ArtifactKey {
            record: index,
            name: record.name.clone(),
            trait_: t,
        };
        let path = scratch.artifact_path(&key);
        artifacts.register(t, path.clone());
        render_distribution(&path, t, cohort.vector(t), record.raw[t])?;
        tracing::debug!(name = %record.name, t = t.name(), path = %path.display(), "rendered distribution");
    }
    Ok(artifacts)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_distribution.rs"]
mod tests;
