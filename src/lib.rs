pub mod cli;
pub mod config;
pub mod error;
pub mod grouper;
pub mod listing;
pub mod outcome;
pub mod purger;
pub mod sampler;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, Command, OutputFormat};
pub use config::{CliOverrides, Config, GroupConfig, PurgeConfig, SampleConfig};
pub use error::{Result, UserFriendlyError, VolkitError};
pub use outcome::{Outcome, SkipReason};

// Core functionality re-exports
pub use grouper::{GroupReport, VolumeGroup, VolumeGrouper, VolumePattern};
pub use purger::{ExtensionPurger, PurgeReport, PURGE_EXTENSION};
pub use sampler::{RowSampler, RowTable, SampleReport, SamplingPolicy};
pub use ui::{OperationProgress, OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::{Path, PathBuf};

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over
/// `default_filter`. Events go to stderr so JSON output on stdout stays
/// machine readable.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main library interface: runs one operation against the configured target
/// and reports through the output formatter.
pub struct Volkit {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Volkit {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a Volkit instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Move slice files of the configured directory into volume directories.
    pub fn group_volumes(&self) -> Result<Outcome<GroupReport>> {
        let directory = self.config.group_directory()?;
        let grouper = VolumeGrouper::new()?;

        self.output_formatter
            .start_operation(&format!("Grouping slice files in {}", directory.display()));

        let total: usize = grouper
            .plan(directory)?
            .iter()
            .map(|group| group.files.len())
            .sum();
        let progress =
            OperationProgress::new(&self.progress_manager, "Moving", "slices", total as u64);
        let on_moved = |destination: &Path| {
            let name = destination.file_name().unwrap_or_default();
            progress.advance(&name.to_string_lossy());
        };

        match grouper.group(directory, Some(&on_moved)) {
            Ok(outcome) => {
                progress.finish(&format!("{} slices moved", progress.position()));
                self.progress_manager.clear();
                Ok(outcome)
            }
            Err(e) => {
                progress.abandon(&format!("stopped after {} slices", progress.position()));
                Err(e)
            }
        }
    }

    /// Slice files of the configured directory grouped by volume, without
    /// moving anything.
    pub fn plan_groups(&self) -> Result<Vec<VolumeGroup>> {
        let directory = self.config.group_directory()?;
        VolumeGrouper::new()?.plan(directory)
    }

    /// Cut the configured CSV file down to `keep_rows` with the configured
    /// policy.
    pub fn sample_rows(&self) -> Result<Outcome<SampleReport>> {
        let (csv_file, keep_rows) = self.config.sample_target()?;
        let policy = self.config.sample.policy;

        self.output_formatter.start_operation(&format!(
            "Sampling {} down to {} rows ({})",
            csv_file.display(),
            keep_rows,
            policy
        ));

        let spinner = self.progress_manager.spinner("Rewriting table");
        let result = RowSampler::new().sample(csv_file, keep_rows, policy);
        spinner.finish_and_clear();

        result
    }

    /// Delete `.nii` files directly inside the configured directory.
    pub fn purge_files(&self) -> Result<Outcome<PurgeReport>> {
        let directory = self.config.purge_directory()?;
        let purger = ExtensionPurger::new();

        self.output_formatter.start_operation(&format!(
            "Removing {} files from {}",
            PURGE_EXTENSION,
            directory.display()
        ));

        let total = purger.plan(directory)?.len();
        let progress =
            OperationProgress::new(&self.progress_manager, "Deleting", "files", total as u64);
        let output =
            ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        let on_removed = |path: &Path| {
            let name = path.file_name().unwrap_or_default();
            progress.advance(&name.to_string_lossy());
            output.notice(&format!("Removed: {}", path.display()));
        };

        match purger.purge(directory, Some(&on_removed)) {
            Ok(outcome) => {
                progress.finish(&format!("{} files deleted", progress.position()));
                self.progress_manager.clear();
                Ok(outcome)
            }
            Err(e) => {
                progress.abandon(&format!("stopped after {} files", progress.position()));
                Err(e)
            }
        }
    }

    /// Files `purge_files` would delete.
    pub fn plan_purge(&self) -> Result<Vec<PathBuf>> {
        let directory = self.config.purge_directory()?;
        ExtensionPurger::new().plan(directory)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path, sample_config).map_err(|e| VolkitError::io(output_path, e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &VolkitError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet(config: Config) -> Volkit {
        Volkit::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_missing_targets_are_reported() {
        let volkit = quiet(Config::default());

        assert!(matches!(
            volkit.group_volumes(),
            Err(VolkitError::MissingTarget { operation: "group" })
        ));
        assert!(matches!(
            volkit.sample_rows(),
            Err(VolkitError::MissingTarget { .. })
        ));
        assert!(matches!(
            volkit.purge_files(),
            Err(VolkitError::MissingTarget { operation: "purge" })
        ));
    }

    #[test]
    fn test_group_volumes_from_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("volume_1_slice_0.h5"), "x").unwrap();
        fs::write(temp_dir.path().join("volume_1_slice_1.h5"), "y").unwrap();

        let mut config = Config::default();
        config.group.directory = Some(temp_dir.path().to_path_buf());
        let volkit = quiet(config);

        assert_eq!(volkit.plan_groups().unwrap().len(), 1);
        let report = volkit.group_volumes().unwrap().completed().unwrap();
        assert_eq!(report.files_moved, 2);
        assert!(temp_dir.path().join("volume_1").join("volume_1_slice_1.h5").exists());
    }

    #[test]
    fn test_sample_rows_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let csv_file = temp_dir.path().join("table.csv");
        fs::write(&csv_file, "id,val\n1,a\n2,b\n3,c\n4,d\n5,e\n").unwrap();

        let mut config = Config::default();
        config.sample.csv_file = Some(csv_file.clone());
        config.sample.keep_rows = Some(3);
        let volkit = quiet(config);

        let report = volkit.sample_rows().unwrap().completed().unwrap();
        assert_eq!(report.rows_after, 4);
        assert!(fs::read_to_string(&csv_file).unwrap().starts_with("id,val\n"));
    }

    #[test]
    fn test_purge_files_from_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("t1.nii"), "x").unwrap();
        fs::write(temp_dir.path().join("t1.h5"), "y").unwrap();

        let mut config = Config::default();
        config.purge.directory = Some(temp_dir.path().to_path_buf());
        let volkit = quiet(config);

        assert_eq!(volkit.plan_purge().unwrap().len(), 1);
        let report = volkit.purge_files().unwrap().completed().unwrap();
        assert_eq!(report.removed, vec![temp_dir.path().join("t1.nii")]);
        assert!(temp_dir.path().join("t1.h5").exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Volkit::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[group]"));
        assert!(content.contains("[sample]"));
        assert!(content.contains("[purge]"));
    }
}
