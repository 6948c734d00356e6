use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolkitError {
    #[error("IO operation failed on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No target given for {operation}")]
    MissingTarget { operation: &'static str },
}

impl VolkitError {
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        VolkitError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn csv<P: AsRef<Path>>(path: P, source: csv::Error) -> Self {
        VolkitError::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            VolkitError::Config { .. } | VolkitError::MissingTarget { .. } => 2,
            VolkitError::InvalidPath { .. } => 3,
            VolkitError::DestinationExists { .. } => 4,
            VolkitError::Csv { .. } => 5,
            VolkitError::Io { .. } | VolkitError::Persist { .. } => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for VolkitError {
    fn user_message(&self) -> String {
        match self {
            VolkitError::Io { path, source } => match source.kind() {
                std::io::ErrorKind::NotFound => {
                    format!("Not found: {}", path.display())
                }
                std::io::ErrorKind::PermissionDenied => {
                    format!("Permission denied accessing: {}", path.display())
                }
                _ => format!("IO error on {}: {}", path.display(), source),
            },
            VolkitError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            VolkitError::DestinationExists { path } => {
                format!("Refusing to overwrite existing file: {}", path.display())
            }
            VolkitError::Csv { path, source } => {
                format!("Could not process CSV file {}: {}", path.display(), source)
            }
            VolkitError::MissingTarget { operation } => {
                format!("No target path given for '{}'", operation)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            VolkitError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Some("Ensure you have read/write permissions for the target directory.".to_string())
            }
            VolkitError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Some("Check the path for typos; relative paths resolve against the current directory.".to_string())
            }
            VolkitError::InvalidPath { .. } => Some(
                "Pass an existing directory (or file, for 'sample') as the positional argument.".to_string()
            ),
            VolkitError::DestinationExists { .. } => Some(
                "A file with the same name is already in the volume directory. Remove or rename one of them and run again; files moved so far stay where they are.".to_string()
            ),
            VolkitError::Csv { .. } => Some(
                "Make sure the file is comma-delimited UTF-8 text.".to_string()
            ),
            VolkitError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            VolkitError::MissingTarget { .. } => Some(
                "Give the path on the command line or set it in volkit.toml.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for VolkitError {
    fn from(error: toml::de::Error) -> Self {
        VolkitError::Config {
            message: format!("Failed to parse config file: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, VolkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = VolkitError::DestinationExists {
            path: PathBuf::from("data/volume_3/volume_3_slice_0.h5"),
        };
        assert!(error.user_message().contains("volume_3_slice_0.h5"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_io_error_messages_by_kind() {
        let not_found = VolkitError::io(
            "missing/dir",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(not_found.user_message().starts_with("Not found"));
        assert!(not_found.suggestion().is_some());

        let denied = VolkitError::io(
            "locked",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(denied.user_message().contains("Permission denied"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            VolkitError::Config {
                message: "bad".to_string()
            }
            .exit_code(),
            2
        );
        assert_eq!(
            VolkitError::MissingTarget { operation: "purge" }.exit_code(),
            2
        );
        assert_eq!(
            VolkitError::InvalidPath {
                path: "x".to_string()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            VolkitError::DestinationExists {
                path: PathBuf::from("x")
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let error = VolkitError::from(toml_error);
        assert!(matches!(error, VolkitError::Config { .. }));
    }
}
