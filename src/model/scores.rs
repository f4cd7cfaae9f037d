use crate::model::traits::{Trait, TraitMap};

pub const NAME_COLUMN: &str = "Name";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub name: String,
    pub raw: TraitMap<f64>,
}

/// Records in input row order. Rows are never merged, even on equal names.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    pub records: Vec<ScoreRecord>,
}

impl ScoreTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cohort(&self) -> Cohort {
        Cohort {
            vectors: TraitMap::from_fn(|t| self.records.iter().map(|r| r.raw[t]).collect()),
        }
    }
}

/// Per-trait score populations of the whole table, built once per run.
#[derive(Debug, Clone)]
pub struct Cohort {
    vectors: TraitMap<Vec<f64>>,
}

impl Cohort {
    pub fn vector(&self, t: Trait) -> &[f64] {
        &self.vectors[t]
    }

    pub fn size(&self) -> usize {
        self.vectors[Trait::Extraversion].len()
    }
}
