use crate::error::{UserFriendlyError, VolkitError};
use crate::grouper::{GroupReport, VolumeGroup};
use crate::outcome::SkipReason;
use crate::purger::PurgeReport;
use crate::sampler::SampleReport;
use console::{style, Emoji, Term};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    /// One line per file touched, shown at the default verbosity.
    pub fn notice(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => println!("  {}", message),
                OutputMode::Json => self.print_json_message("notice", message),
                OutputMode::Plain => println!("{}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &VolkitError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// A soft no-op: nothing was changed on disk.
    pub fn print_skipped(&self, operation: &str, reason: &SkipReason) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "result",
                "operation": operation,
                "status": "skipped",
                "detail": reason,
            })),
            _ => self.warning(&format!(
                "{}: {}; nothing was changed",
                operation,
                capitalize(&reason.to_string())
            )),
        }
    }

    // Reports
    pub fn print_group_report(&self, report: &GroupReport) {
        match self.mode {
            OutputMode::Json => self.print_json_result("group", report),
            OutputMode::Human => {
                self.print_header("Grouping Report");
                self.print_groups(&report.groups);
                self.success(&format!(
                    "Moved {} files into {} volume directories under {}",
                    report.files_moved,
                    report.volume_count(),
                    report.directory.display()
                ));
            }
            OutputMode::Plain => {
                println!("REPORT: Grouping completed");
                println!("Directory: {}", report.directory.display());
                println!("Volumes: {}", report.volume_count());
                println!("Files moved: {}", report.files_moved);
            }
        }
    }

    pub fn print_group_plan(&self, directory: &Path, groups: &[VolumeGroup]) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "plan",
                "operation": "group",
                "directory": directory,
                "groups": groups,
            })),
            _ => {
                self.info("DRY RUN MODE - No files will be moved");
                self.print_separator();
                self.print_groups(groups);
                let files: usize = groups.iter().map(|g| g.files.len()).sum();
                self.success(&format!(
                    "Would move {} files into {} volume directories",
                    files,
                    groups.len()
                ));
            }
        }
    }

    pub fn print_sample_report(&self, report: &SampleReport) {
        match self.mode {
            OutputMode::Json => self.print_json_result("sample", report),
            OutputMode::Human => {
                self.print_header("Sampling Report");
                println!("File:    {}", report.path.display());
                println!("Policy:  {}", report.policy);
                println!("Rows:    {} -> {}", report.rows_before, report.rows_after);
                println!("Removed: {}", report.rows_removed);
                println!();
                self.success(&format!("{} rows remaining after deletion", report.rows_after));
            }
            OutputMode::Plain => {
                println!("REPORT: Sampling completed");
                println!("File: {}", report.path.display());
                println!("Policy: {}", report.policy);
                println!("Rows before: {}", report.rows_before);
                println!("Rows after: {}", report.rows_after);
            }
        }
    }

    pub fn print_purge_report(&self, report: &PurgeReport) {
        match self.mode {
            OutputMode::Json => self.print_json_result("purge", report),
            OutputMode::Human => self.success(&format!(
                "Removed {} files from {}",
                report.removed.len(),
                report.directory.display()
            )),
            OutputMode::Plain => {
                println!("REPORT: Purge completed");
                println!("Directory: {}", report.directory.display());
                println!("Files removed: {}", report.removed.len());
            }
        }
    }

    pub fn print_purge_plan(&self, directory: &Path, targets: &[PathBuf]) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "plan",
                "operation": "purge",
                "directory": directory,
                "files": targets,
            })),
            _ => {
                self.info("DRY RUN MODE - No files will be deleted");
                self.print_separator();
                for target in targets {
                    self.notice(&format!("Would remove: {}", target.display()));
                }
                self.success(&format!("Would remove {} files", targets.len()));
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_groups(&self, groups: &[VolumeGroup]) {
        if self.quiet {
            return;
        }

        for group in groups {
            println!("  {}: {} files", group.directory_name(), group.files.len());
            for file in &group.files {
                self.debug(file);
            }
        }
        println!();
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_result<T: Serialize>(&self, operation: &str, report: &T) {
        self.print_json_object(&serde_json::json!({
            "type": "result",
            "operation": operation,
            "status": "completed",
            "detail": report,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn notice(&self, message: &str) {
        self.suspend_and_print(|f| f.notice(message));
    }
}
