use crate::model::{Cohort, ScoreTable, TraitMap};

#[derive(Debug)]
pub struct Stage1Output {
    pub cohort: Cohort,
    /// Aligned with `ScoreTable::records`.
    pub percentiles: Vec<TraitMap<f64>>,
}

pub fn run_stage1(table: &ScoreTable) -> Stage1Output {
    let cohort = table.cohort();
    let percentiles = table
        .records
        .iter()
        .map(|record| TraitMap::from_fn(|t| percentile_of_score(cohort.vector(t), record.raw[t])))
        .collect::<Vec<TraitMap<f64>>>();

    tracing::debug!(cohort_size = cohort.size(), "computed percentiles");
    for (record, ranks) in table.records.iter().zip(&percentiles) {
        for (t, p) in ranks.iter() {
            tracing::trace!(name = %record.name, t = t.name(), percentile = *p);
        }
    }

    Stage1Output {
        cohort,
        percentiles,
    }
}

/// Mean-rank percentile of `x` within `cohort`: `(lt + le) / 2n * 100`,
/// rounded to two decimals. Ties land in the middle, so an all-equal cohort
/// gives 50.0.
pub fn percentile_of_score(cohort: &[f64], x: f64) -> f64 {
    let n = cohort.len();
    if n == 0 {
        return 0.0;
    }
    let mut lt = 0usize;
    let mut le = 0usize;
    for &v in cohort {
        if v < x {
            lt += 1;
        }
        if v <= x {
            le += 1;
        }
    }
    round2((lt + le) as f64 / (2 * n) as f64 * 100.0)
}

/// Two decimals, exact halves to even (`3.125` -> `3.12`).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_percentile.rs"]
mod tests;
