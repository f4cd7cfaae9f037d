pub mod scores;
pub mod traits;

pub use scores::{Cohort, ScoreRecord, ScoreTable};
pub use traits::{Trait, TraitMap};
