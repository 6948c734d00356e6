use crate::error::{Result, VolkitError};
use crate::listing;
use crate::outcome::{Outcome, SkipReason};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Files whose name ends with this suffix are deleted.
pub const PURGE_EXTENSION: &str = ".nii";

#[derive(Debug, Clone, Serialize)]
pub struct PurgeReport {
    pub directory: PathBuf,
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ExtensionPurger;

impl ExtensionPurger {
    pub fn new() -> Self {
        Self
    }

    pub fn matches(name: &str) -> bool {
        name.ends_with(PURGE_EXTENSION)
    }

    /// Files directly under `dir` that `purge` would delete.
    pub fn plan<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let mut targets = Vec::new();

        for entry in listing::list_entries(dir.as_ref())? {
            if !Self::matches(&entry.name) {
                continue;
            }
            if entry.is_dir {
                tracing::debug!(path = %entry.path.display(), "skipping directory");
                continue;
            }
            targets.push(entry.path);
        }

        Ok(targets)
    }

    /// Deletes every `.nii` file directly under `dir`. The first failed
    /// deletion aborts the run.
    pub fn purge<P: AsRef<Path>>(
        &self,
        dir: P,
        on_removed: Option<&dyn Fn(&Path)>,
    ) -> Result<Outcome<PurgeReport>> {
        let dir = dir.as_ref();
        let targets = self.plan(dir)?;

        if targets.is_empty() {
            tracing::info!(directory = %dir.display(), "no {} files found", PURGE_EXTENSION);
            return Ok(Outcome::Skipped(SkipReason::NoMatchingFiles));
        }

        let mut removed = Vec::with_capacity(targets.len());
        for path in targets {
            fs::remove_file(&path).map_err(|e| VolkitError::io(&path, e))?;

            tracing::info!(path = %path.display(), "removed");
            if let Some(callback) = on_removed {
                callback(&path);
            }
            removed.push(path);
        }

        Ok(Outcome::Completed(PurgeReport {
            directory: dir.to_path_buf(),
            removed,
        }))
    }
}
