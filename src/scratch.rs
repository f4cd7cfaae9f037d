use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Trait;
use crate::report::sanitize_file_component;

#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("IO error on scratch path {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("scratch directory {path} is not empty; refusing to use it")]
    NotEmpty { path: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ScratchError + '_ {
    move |source| ScratchError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Identity of one visual artifact. The row index keeps keys distinct even
/// when display names coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub record: usize,
    pub name: String,
    pub trait_: Trait,
}

impl ArtifactKey {
    pub fn file_name(&self) -> String {
        format!(
            "{:05}_{}_{}.png",
            self.record,
            sanitize_file_component(&self.name),
            self.trait_.name()
        )
    }
}

/// Scratch directory for one run. Must be empty on acquisition and is removed
/// on release, which fails if anything was left behind.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn acquire(root: &Path) -> Result<Self, ScratchError> {
        fs::create_dir_all(root).map_err(io_err(root))?;
        let mut entries = fs::read_dir(root).map_err(io_err(root))?;
        if entries.next().is_some() {
            return Err(ScratchError::NotEmpty {
                path: root.display().to_string(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    pub fn begin_individual(&self) -> ArtifactSet {
        ArtifactSet::default()
    }

    pub fn release(mut self) -> Result<(), ScratchError> {
        let root = std::mem::take(&mut self.root);
        fs::remove_dir(&root).map_err(io_err(&root))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.root.as_os_str().is_empty() {
            // Only succeeds when empty; leftovers are kept for inspection.
            let _ = fs::remove_dir(&self.root);
        }
    }
}

/// Artifacts created for the individual in progress. Files still registered
/// when the set is dropped are deleted, so an aborted iteration leaves no
/// scratch files behind.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    entries: Vec<(Trait, PathBuf)>,
}

impl ArtifactSet {
    pub fn register(&mut self, t: Trait, path: PathBuf) {
        self.entries.push((t, path));
    }

    pub fn get(&self, t: Trait) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| *k == t)
            .map(|(_, p)| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deletes every registered artifact, reporting the first failure.
    pub fn reclaim(mut self) -> Result<(), ScratchError> {
        let entries = std::mem::take(&mut self.entries);
        let mut first_err = None;
        for (_, path) in entries {
            if let Err(source) = fs::remove_file(&path) {
                if first_err.is_none() {
                    first_err = Some(ScratchError::Io {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }
        for (_, path) in self.entries.drain(..) {
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %err, "failed to remove scratch artifact");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/scratch.rs"]
mod tests;
