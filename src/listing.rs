use crate::error::{Result, VolkitError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One entry directly under a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// Lists the immediate children of `dir` in the order the filesystem returns
/// them. Entries whose names are not valid UTF-8 are skipped.
pub fn list_entries<P: AsRef<Path>>(dir: P) -> Result<Vec<FileEntry>> {
    let dir = dir.as_ref();

    let metadata = std::fs::metadata(dir).map_err(|e| VolkitError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(VolkitError::InvalidPath {
            path: format!("{} is not a directory", dir.display()),
        });
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            VolkitError::io(path, source)
        })?;

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };

        entries.push(FileEntry {
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
            name,
        });
    }

    Ok(entries)
}
