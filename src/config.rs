use crate::error::{Result, VolkitError};
use crate::sampler::SamplingPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no `--config` is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["volkit.toml", ".volkit.toml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub group: GroupConfig,
    pub sample: SampleConfig,
    pub purge: PurgeConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SampleConfig {
    pub csv_file: Option<PathBuf>,
    pub keep_rows: Option<usize>,
    pub policy: SamplingPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PurgeConfig {
    pub directory: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VolkitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VolkitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content)?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in &DEFAULT_CONFIG_PATHS {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref directory) = cli_args.group_directory {
            self.group.directory = Some(directory.clone());
        }

        if let Some(ref csv_file) = cli_args.csv_file {
            self.sample.csv_file = Some(csv_file.clone());
        }

        if let Some(keep_rows) = cli_args.keep_rows {
            self.sample.keep_rows = Some(keep_rows);
        }

        if let Some(policy) = cli_args.policy {
            self.sample.policy = policy;
        }

        if let Some(ref directory) = cli_args.purge_directory {
            self.purge.directory = Some(directory.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("group.directory", &self.group.directory),
            ("sample.csv_file", &self.sample.csv_file),
            ("purge.directory", &self.purge.directory),
        ];

        for (key, path) in paths {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                return Err(VolkitError::Config {
                    message: format!("{} must not be empty", key),
                });
            }
        }

        Ok(())
    }

    pub fn group_directory(&self) -> Result<&Path> {
        self.group
            .directory
            .as_deref()
            .ok_or(VolkitError::MissingTarget { operation: "group" })
    }

    pub fn sample_target(&self) -> Result<(&Path, usize)> {
        let csv_file = self
            .sample
            .csv_file
            .as_deref()
            .ok_or(VolkitError::MissingTarget { operation: "sample" })?;
        let keep_rows = self.sample.keep_rows.ok_or(VolkitError::MissingTarget {
            operation: "sample --keep",
        })?;
        Ok((csv_file, keep_rows))
    }

    pub fn purge_directory(&self) -> Result<&Path> {
        self.purge
            .directory
            .as_deref()
            .ok_or(VolkitError::MissingTarget { operation: "purge" })
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self {
            group: GroupConfig {
                directory: Some(PathBuf::from("BraTS2020_training_data/content/data")),
            },
            sample: SampleConfig {
                csv_file: Some(PathBuf::from("radiomic_table_validation.csv")),
                keep_rows: Some(100),
                policy: SamplingPolicy::default(),
            },
            purge: PurgeConfig {
                directory: Some(PathBuf::from("BraTS2020_training_data/content/data/volume_1")),
            },
        };
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub group_directory: Option<PathBuf>,
    pub csv_file: Option<PathBuf>,
    pub keep_rows: Option<usize>,
    pub policy: Option<SamplingPolicy>,
    pub purge_directory: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.group_directory = directory;
        self
    }

    pub fn with_csv_file(mut self, csv_file: Option<PathBuf>) -> Self {
        self.csv_file = csv_file;
        self
    }

    pub fn with_keep_rows(mut self, keep_rows: Option<usize>) -> Self {
        self.keep_rows = keep_rows;
        self
    }

    pub fn with_policy(mut self, policy: Option<SamplingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_purge_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.purge_directory = directory;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_has_no_targets() {
        let config = Config::default();
        assert!(config.group.directory.is_none());
        assert!(config.sample.csv_file.is_none());
        assert!(config.sample.keep_rows.is_none());
        assert_eq!(config.sample.policy, SamplingPolicy::ExcludingHeader);
        assert!(config.validate().is_ok());

        assert!(matches!(
            config.group_directory(),
            Err(VolkitError::MissingTarget { operation: "group" })
        ));
        assert!(config.sample_target().is_err());
        assert!(config.purge_directory().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.purge.directory = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            "[sample]\nkeep_rows = 42\npolicy = \"without-header\"\n",
        )
        .unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.sample.keep_rows, Some(42));
        assert_eq!(loaded_config.sample.policy, SamplingPolicy::WithoutHeader);
        assert!(loaded_config.group.directory.is_none());
    }

    #[test]
    fn test_partial_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[purge]\ndirectory = \"scans\"\n").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.purge_directory().unwrap(), Path::new("scans"));
        assert_eq!(config.sample.policy, SamplingPolicy::ExcludingHeader);
    }

    #[test]
    fn test_malformed_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[sample]\nkeep_rows = \"many\"\n").unwrap();

        let result = Config::load_from_file(temp_file.path());
        assert!(matches!(result, Err(VolkitError::Config { .. })));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(VolkitError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        config.sample.keep_rows = Some(5);

        let overrides = CliOverrides::new()
            .with_csv_file(Some(PathBuf::from("table.csv")))
            .with_keep_rows(Some(3))
            .with_policy(Some(SamplingPolicy::WithoutHeader));

        config.merge_with_cli_args(&overrides);

        let (csv_file, keep_rows) = config.sample_target().unwrap();
        assert_eq!(csv_file, Path::new("table.csv"));
        assert_eq!(keep_rows, 3);
        assert_eq!(config.sample.policy, SamplingPolicy::WithoutHeader);
        assert!(config.group.directory.is_none());
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[group]"));
        assert!(sample.contains("[sample]"));
        assert!(sample.contains("[purge]"));
        assert!(sample.contains("excluding-header"));

        let parsed: Config = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.sample.keep_rows, Some(100));
    }
}
