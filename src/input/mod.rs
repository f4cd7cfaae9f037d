use std::collections::BTreeMap;
use std::path::Path;

pub mod candidates;
pub mod narrative;

use serde::Deserialize;
use thiserror::Error;

use crate::model::scores::NAME_COLUMN;
use crate::model::{ScoreRecord, ScoreTable, Trait, TraitMap};
use crate::report::report_file_name;

pub use candidates::list_candidates;
pub use narrative::{Narrative, load_narrative};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("duplicate names would overwrite each other's report: {}", names.join(", "))]
    DuplicateNames { names: Vec<String> },
}

/// Header labels the input table must carry, identity first.
pub fn required_columns() -> Vec<&'static str> {
    let mut out = vec![NAME_COLUMN];
    out.extend(Trait::ALL.iter().map(|t| t.column()));
    out
}

/// Returns every required column absent from `headers`, in canonical order.
pub fn check_schema<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(), InputError> {
    let present: Vec<&str> = headers.into_iter().collect();
    let missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|col| !present.contains(col))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(InputError::Schema { missing })
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Extraversion Score")]
    extraversion: f64,
    #[serde(rename = "Agreeableness Score")]
    agreeableness: f64,
    #[serde(rename = "Conscientiousness Score")]
    conscientiousness: f64,
    #[serde(rename = "Neuroticism Score")]
    neuroticism: f64,
    #[serde(rename = "Openness Score")]
    openness: f64,
}

impl ScoreRow {
    fn score(&self, t: Trait) -> f64 {
        match t {
            Trait::Extraversion => self.extraversion,
            Trait::Agreeableness => self.agreeableness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Neuroticism => self.neuroticism,
            Trait::Openness => self.openness,
        }
    }
}

pub fn load_score_table(path: &Path) -> Result<ScoreTable, InputError> {
    let shown = path.display().to_string();
    let csv_err = |source: csv::Error| InputError::Csv {
        path: shown.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(&csv_err)?;

    let headers = reader.headers().map_err(&csv_err)?.clone();
    check_schema(headers.iter())?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<ScoreRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = row.map_err(|e| InputError::Parse {
            line,
            message: e.to_string(),
        })?;
        for t in Trait::ALL {
            let v = row.score(t);
            if !v.is_finite() {
                return Err(InputError::Parse {
                    line,
                    message: format!("{} is not a finite number: {v}", t.column()),
                });
            }
        }
        records.push(ScoreRecord {
            raw: TraitMap::from_fn(|t| row.score(t)),
            name: row.name,
        });
    }

    let table = ScoreTable { records };
    check_unique_names(&table)?;
    tracing::info!(
        path = %shown,
        individuals = table.len(),
        "loaded score table"
    );
    Ok(table)
}

/// Names are compared by the report file they would produce.
pub fn check_unique_names(table: &ScoreTable) -> Result<(), InputError> {
    let mut seen: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for record in &table.records {
        seen.entry(report_file_name(&record.name))
            .or_default()
            .push(record.name.as_str());
    }
    let names: Vec<String> = seen
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|group| group.join(" / "))
        .collect();
    if names.is_empty() {
        Ok(())
    } else {
        Err(InputError::DuplicateNames { names })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
