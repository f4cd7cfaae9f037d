mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod scratch;

use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::input::{InputError, list_candidates, load_narrative, load_score_table, required_columns};
use crate::pipeline::stage1_percentile::run_stage1;
use crate::pipeline::stage4_report::{ReportError, Stage4Input, write_reports};
use crate::scratch::{ScratchDir, ScratchError};

const USAGE_BANNER: &str = "\
\tWelcome to bfi-report. This program generates PDF files containing plots of each
\tindividual's Big Five inventory scores drawn on top of the distribution of scores
\tfor the rest of the class. It does not send emails, it only generates the reports.
\tExample usage: bfi-report -p OpeningParagraph.txt -i big_five_results.csv -t tmp -o GeneratedReports";

#[derive(Debug, Parser)]
#[command(
    name = "bfi-report",
    version,
    about = "Generate per-person Big Five inventory PDF reports against the class distribution."
)]
struct Cli {
    /// Plain text file holding the opening paragraph (not a Word document).
    #[arg(short = 'p', long = "opening-paragraph")]
    opening_paragraph: Option<PathBuf>,

    /// CSV file with a Name column and one total score column per trait.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Scratch folder for the individual plots; removed once all reports exist.
    #[arg(short = 't', long = "tmp", default_value = "tmp")]
    tmp: PathBuf,

    /// Folder the reports are written to.
    #[arg(short = 'o', long = "output-folder", default_value = "BFI_reports")]
    output_folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunConfig {
    narrative_path: PathBuf,
    input_path: PathBuf,
    scratch_dir: PathBuf,
    out_dir: PathBuf,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("You have not entered a text file containing the text for the opening paragraph. Please add a file using the -p option.")]
    MissingNarrative { candidates: Vec<String> },
    #[error("You have not entered an input csv file containing the scores for each person. Please add a csv file using the -i option.")]
    MissingInput { candidates: Vec<String> },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Scratch(#[from] ScratchError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        print_diagnostic(&err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = build_config(cli, &cwd)?;

    let table = load_score_table(&config.input_path)?;
    if table.is_empty() {
        tracing::warn!(path = %config.input_path.display(), "input table has no rows; no reports will be written");
    }
    let narrative = load_narrative(&config.narrative_path)?;
    let stage1 = run_stage1(&table);

    let scratch = ScratchDir::acquire(&config.scratch_dir)?;
    let written = write_reports(
        &Stage4Input {
            table: &table,
            stage1: &stage1,
            narrative: &narrative,
        },
        scratch,
        &config.out_dir,
    )?;

    tracing::info!(
        reports = written.len(),
        out_dir = %config.out_dir.display(),
        "done"
    );
    Ok(())
}

fn build_config(cli: Cli, cwd: &Path) -> Result<RunConfig, RunError> {
    let narrative_path = cli.opening_paragraph.ok_or_else(|| RunError::MissingNarrative {
        candidates: list_candidates(cwd, "txt").unwrap_or_default(),
    })?;
    let input_path = cli.input.ok_or_else(|| RunError::MissingInput {
        candidates: list_candidates(cwd, "csv").unwrap_or_default(),
    })?;
    Ok(RunConfig {
        narrative_path,
        input_path,
        scratch_dir: cli.tmp,
        out_dir: cli.output_folder,
    })
}

fn candidate_listing(candidates: &[String], kind: &str) -> String {
    if candidates.is_empty() {
        return format!("\tNo {kind} files are present in your current working directory.\n");
    }
    let mut out = format!("\t{kind} files that are present in your current working directory:\n");
    for name in candidates {
        out.push_str(&format!("\t\t{name}\n"));
    }
    out
}

/// Banner text for failures the user fixes by changing the invocation or the
/// input table. Other failures are only logged.
fn render_diagnostic(err: &RunError) -> Option<String> {
    let text = match err {
        RunError::MissingNarrative { candidates } => format!(
            "\n{USAGE_BANNER}\n\n\t{err}\n\n{}",
            candidate_listing(candidates, "text")
        ),
        RunError::MissingInput { candidates } => format!(
            "\n{USAGE_BANNER}\n\n\t{err}\n\n{}",
            candidate_listing(candidates, "csv")
        ),
        RunError::Input(InputError::Schema { missing }) => {
            let mut msg = format!(
                "\n{USAGE_BANNER}\n\n\tThe input csv file is missing required columns: {}\n\tPlease relabel your column headers and ensure the following labels are all accounted for:\n\n",
                missing.join(", ")
            );
            for column in required_columns() {
                msg.push_str(&format!("\t{column}\n"));
            }
            msg
        }
        _ => return None,
    };
    Some(text)
}

fn print_diagnostic(err: &RunError) {
    match render_diagnostic(err) {
        Some(text) => eprintln!("{text}"),
        None => tracing::error!(error = %err, "run failed"),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
