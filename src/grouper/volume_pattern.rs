use crate::error::{Result, VolkitError};
use regex::Regex;

/// Slice file names look like `volume_<id>_slice_<n>.h5`.
pub const VOLUME_FILE_PATTERN: &str = r"^volume_(\d+)_slice_\d+\.h5$";

/// Prefix of the per-volume directory created next to the slice files.
pub const VOLUME_DIR_PREFIX: &str = "volume_";

pub struct VolumePattern {
    regex: Regex,
}

impl VolumePattern {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(VOLUME_FILE_PATTERN).map_err(|e| VolkitError::Config {
            message: format!("Invalid volume file pattern: {}", e),
        })?;
        Ok(Self { regex })
    }

    /// Volume identifier encoded in `name`, or `None` if the name is not a
    /// slice file.
    pub fn volume_id<'n>(&self, name: &'n str) -> Option<&'n str> {
        self.regex
            .captures(name)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn directory_name(volume_id: &str) -> String {
        format!("{}{}", VOLUME_DIR_PREFIX, volume_id)
    }
}
