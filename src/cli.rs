use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::sampler::SamplingPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "volkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Housekeeping utilities for slice-based imaging datasets")]
#[command(
    long_about = "volkit groups per-slice files into per-volume directories, cuts CSV \
                  tables down to a target row count, and removes leftover .nii files."
)]
#[command(after_help = "EXAMPLES:\n  \
    volkit group BraTS2020_training_data/content/data\n  \
    volkit group data --dry-run\n  \
    volkit sample radiomic_table_validation.csv --keep 100\n  \
    volkit sample table.csv --keep 50 --policy without-header\n  \
    volkit purge data/volume_1\n  \
    volkit --config volkit.toml purge")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file (to --config or volkit.toml)")]
    pub generate_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move volume_<id>_slice_<n>.h5 files into volume_<id>/ directories
    Group {
        /// Directory holding the slice files
        directory: Option<PathBuf>,

        /// Show the grouping without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Randomly delete rows from a CSV file until a target count remains
    Sample {
        /// CSV file to rewrite in place
        csv_file: Option<PathBuf>,

        /// Number of rows to keep (not counting the header)
        #[arg(short = 'n', long)]
        keep: Option<usize>,

        /// Which rows are candidates for deletion
        #[arg(long, value_enum)]
        policy: Option<SamplingPolicy>,
    },

    /// Delete every .nii file directly inside a directory
    Purge {
        /// Directory to clean
        directory: Option<PathBuf>,

        /// List the files without deleting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        match &self.command {
            Some(Command::Group { directory, .. }) => {
                CliOverrides::new().with_group_directory(directory.clone())
            }
            Some(Command::Sample {
                csv_file,
                keep,
                policy,
            }) => CliOverrides::new()
                .with_csv_file(csv_file.clone())
                .with_keep_rows(*keep)
                .with_policy(*policy),
            Some(Command::Purge { directory, .. }) => {
                CliOverrides::new().with_purge_directory(directory.clone())
            }
            None => CliOverrides::new(),
        }
    }

    pub fn config_output_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("volkit.toml"))
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "volkit=error";
        }
        match self.verbose {
            0 => "volkit=warn",
            1 => "volkit=info",
            _ => "volkit=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("volkit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_group() {
        let cli = parse(&["group", "data", "--dry-run"]);
        match cli.command {
            Some(Command::Group { ref directory, dry_run }) => {
                assert_eq!(directory.as_deref(), Some(Path::new("data")));
                assert!(dry_run);
            }
            ref other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sample() {
        let cli = parse(&["sample", "t.csv", "-n", "3", "--policy", "without-header"]);
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.csv_file.as_deref(), Some(Path::new("t.csv")));
        assert_eq!(overrides.keep_rows, Some(3));
        assert_eq!(overrides.policy, Some(SamplingPolicy::WithoutHeader));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["purge", "scans", "-vv", "--output-format", "json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.output_format, OutputFormat::Json));
        assert_eq!(cli.log_filter(), "volkit=debug");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["volkit", "-q", "-v", "purge", "x"]);
        assert!(result.is_err());

        let cli = parse(&["-q", "purge", "x"]);
        assert!(cli.quiet);
        assert_eq!(cli.log_filter(), "volkit=error");
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = Cli::try_parse_from(["volkit", "sample", "t.csv", "--policy", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_output_path() {
        let cli = parse(&["--generate-config"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config_output_path(), PathBuf::from("volkit.toml"));
    }
}
