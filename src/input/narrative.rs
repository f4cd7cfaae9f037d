use std::path::Path;

use crate::input::InputError;

/// Opening paragraph shared by every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    text: String,
}

impl Narrative {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

pub fn load_narrative(path: &Path) -> Result<Narrative, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Narrative::new(text))
}
