use clap::Parser;
use std::process;
use volkit::{
    Cli, Command, OutputFormatter, OutputMode, Outcome, Result, SkipReason, UserFriendlyError,
    Volkit, VolkitError,
};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    volkit::init_logging(cli.log_filter());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let Some(command) = cli.command.clone() else {
        eprintln!("No command given. Run `volkit --help` for usage.");
        return 2;
    };

    let volkit = match Volkit::from_cli(&cli) {
        Ok(volkit) => volkit,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    match command {
        Command::Group { dry_run: true, .. } => handle_group_dry_run(&volkit),
        Command::Group { .. } => finish(&volkit, "Grouping", volkit.group_volumes(), |f, report| {
            f.print_group_report(report)
        }),
        Command::Sample { .. } => finish(&volkit, "Sampling", volkit.sample_rows(), |f, report| {
            f.print_sample_report(report)
        }),
        Command::Purge { dry_run: true, .. } => handle_purge_dry_run(&volkit),
        Command::Purge { .. } => finish(&volkit, "Purge", volkit.purge_files(), |f, report| {
            f.print_purge_report(report)
        }),
    }
}

/// Prints the outcome of an operation and maps it to an exit code. A skipped
/// run is a soft success.
fn finish<T>(
    volkit: &Volkit,
    operation: &str,
    result: Result<Outcome<T>>,
    print_report: impl Fn(&OutputFormatter, &T),
) -> i32 {
    match result {
        Ok(Outcome::Completed(report)) => {
            print_report(volkit.output_formatter(), &report);
            0
        }
        Ok(Outcome::Skipped(reason)) => {
            volkit.output_formatter().print_skipped(operation, &reason);
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "{} failed", operation);
            volkit.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli.config_output_path();

    match Volkit::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nTo use this configuration:");
            println!("  volkit --config {} group", config_path.display());
            println!("\nEdit the file to point at your dataset.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_group_dry_run(volkit: &Volkit) -> i32 {
    let formatter = volkit.output_formatter();

    let directory = match volkit.config().group_directory() {
        Ok(directory) => directory,
        Err(e) => {
            volkit.handle_error(&e);
            return e.exit_code();
        }
    };

    match volkit.plan_groups() {
        Ok(groups) if groups.is_empty() => {
            formatter.print_skipped("Grouping", &SkipReason::NoMatchingFiles);
            0
        }
        Ok(groups) => {
            formatter.print_group_plan(directory, &groups);
            0
        }
        Err(e) => {
            volkit.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_purge_dry_run(volkit: &Volkit) -> i32 {
    let formatter = volkit.output_formatter();

    let directory = match volkit.config().purge_directory() {
        Ok(directory) => directory,
        Err(e) => {
            volkit.handle_error(&e);
            return e.exit_code();
        }
    };

    match volkit.plan_purge() {
        Ok(targets) if targets.is_empty() => {
            formatter.print_skipped("Purge", &SkipReason::NoMatchingFiles);
            0
        }
        Ok(targets) => {
            formatter.print_purge_plan(directory, &targets);
            0
        }
        Err(e) => {
            volkit.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &VolkitError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
