use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::Narrative;
use crate::model::ScoreTable;
use crate::pipeline::stage1_percentile::Stage1Output;
use crate::pipeline::stage2_distribution::{RenderError, render_individual};
use crate::pipeline::stage3_layout::{
    ComposeError, ReportInput, compose_report, narrative_overflows,
};
use crate::report::pdf::write_document;
use crate::report::report_file_name;
use crate::scratch::{ScratchDir, ScratchError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scratch(#[from] ScratchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

#[derive(Debug, Clone, Copy)]
pub struct Stage4Input<'a> {
    pub table: &'a ScoreTable,
    pub stage1: &'a Stage1Output,
    pub narrative: &'a Narrative,
}

/// Renders, composes and persists one report per record, strictly in table
/// order. Each individual's artifacts are gone before the next individual
/// starts, and the scratch directory itself is removed at the end.
pub fn write_reports(
    input: &Stage4Input<'_>,
    scratch: ScratchDir,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir).map_err(|source| ReportError::OutputDir {
        path: out_dir.display().to_string(),
        source,
    })?;

    if narrative_overflows(input.narrative) {
        tracing::warn!("opening paragraph runs into the Extraversion block on page 1");
    }

    tracing::debug!(scratch = %scratch.path().display(), "using scratch directory");

    let mut written = Vec::with_capacity(input.table.len());
    for (index, record) in input.table.records.iter().enumerate() {
        let artifacts = render_individual(&scratch, &input.stage1.cohort, index, record)?;
        tracing::info!(
            name = %record.name,
            figures = artifacts.len(),
            "created individual figures"
        );

        let layout = compose_report(&ReportInput {
            record,
            percentiles: &input.stage1.percentiles[index],
            artifacts: &artifacts,
            narrative: input.narrative,
        })?;
        let path = out_dir.join(report_file_name(&record.name));
        write_document(&layout, &path).map_err(ComposeError::from)?;
        tracing::info!(name = %record.name, path = %path.display(), "created report");

        artifacts.reclaim()?;
        written.push(path);
    }

    scratch.release()?;
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
