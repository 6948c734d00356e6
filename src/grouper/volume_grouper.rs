use crate::error::{Result, VolkitError};
use crate::grouper::volume_pattern::VolumePattern;
use crate::listing;
use crate::outcome::{Outcome, SkipReason};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Slice files sharing one volume identifier, in directory-listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeGroup {
    pub volume_id: String,
    pub files: Vec<String>,
}

impl VolumeGroup {
    pub fn directory_name(&self) -> String {
        VolumePattern::directory_name(&self.volume_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub directory: PathBuf,
    pub groups: Vec<VolumeGroup>,
    pub files_moved: usize,
}

impl GroupReport {
    pub fn volume_count(&self) -> usize {
        self.groups.len()
    }
}

pub struct VolumeGrouper {
    pattern: VolumePattern,
}

impl VolumeGrouper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: VolumePattern::new()?,
        })
    }

    /// Groups the slice files directly under `dir` by volume without touching
    /// the filesystem. Groups are ordered by first appearance.
    pub fn plan<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<VolumeGroup>> {
        let entries = listing::list_entries(dir.as_ref())?;

        let mut groups: Vec<VolumeGroup> = Vec::new();
        let mut index_by_id: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let Some(volume_id) = self.pattern.volume_id(&entry.name) else {
                tracing::debug!(name = %entry.name, "not a slice file, leaving in place");
                continue;
            };

            let index = match index_by_id.get(volume_id) {
                Some(&index) => index,
                None => {
                    groups.push(VolumeGroup {
                        volume_id: volume_id.to_string(),
                        files: Vec::new(),
                    });
                    index_by_id.insert(volume_id.to_string(), groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[index].files.push(entry.name);
        }

        Ok(groups)
    }

    /// Moves every slice file under `dir` into `dir/volume_<id>/`.
    ///
    /// Stops at the first failed move; files moved before the failure stay
    /// in their volume directory.
    pub fn group<P: AsRef<Path>>(
        &self,
        dir: P,
        on_moved: Option<&dyn Fn(&Path)>,
    ) -> Result<Outcome<GroupReport>> {
        let dir = dir.as_ref();
        let groups = self.plan(dir)?;

        if groups.is_empty() {
            tracing::info!(directory = %dir.display(), "no slice files to group");
            return Ok(Outcome::Skipped(SkipReason::NoMatchingFiles));
        }

        let mut files_moved = 0;
        for group in &groups {
            let volume_dir = dir.join(group.directory_name());
            fs::create_dir_all(&volume_dir).map_err(|e| VolkitError::io(&volume_dir, e))?;

            for file in &group.files {
                let source = dir.join(file);
                let destination = volume_dir.join(file);
                move_file(&source, &destination)?;
                files_moved += 1;

                tracing::info!(
                    from = %source.display(),
                    to = %destination.display(),
                    "moved slice file"
                );
                if let Some(callback) = on_moved {
                    callback(&destination);
                }
            }
        }

        tracing::info!(
            volumes = groups.len(),
            files = files_moved,
            "grouping finished"
        );

        Ok(Outcome::Completed(GroupReport {
            directory: dir.to_path_buf(),
            groups,
            files_moved,
        }))
    }
}

fn move_file(source: &Path, destination: &Path) -> Result<()> {
    // symlink_metadata so a dangling link still counts as taken.
    if fs::symlink_metadata(destination).is_ok() {
        return Err(VolkitError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }

    fs::rename(source, destination).map_err(|e| VolkitError::io(source, e))
}
