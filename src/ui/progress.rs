use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(100);

/// Owns every bar drawn during a run. When disabled (quiet, JSON or plain
/// output) all bars are hidden and `suspend` just runs the closure.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Counted bar, e.g. `[####>----]  3/12 slices volume_3_slice_1.h5`.
    pub fn bar(&self, total: u64, unit: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let template = format!(
            "{{spinner:.green}} [{{bar:30.cyan/blue}}] {{pos:>5}}/{{len:5}} {} {{msg}}",
            unit
        );
        let pb = self.multi_progress.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(TICK);
        pb
    }

    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }
}

/// Progress of one move or delete pass, counted in files.
pub struct OperationProgress {
    progress_bar: ProgressBar,
    label: String,
    started: Instant,
}

impl OperationProgress {
    /// `label` prefixes the final line ("Moving: 12 slices moved in 40ms");
    /// `unit` names what is counted on the bar.
    pub fn new(manager: &ProgressManager, label: &str, unit: &str, total: u64) -> Self {
        Self {
            progress_bar: manager.bar(total, unit),
            label: label.to_string(),
            started: Instant::now(),
        }
    }

    /// Counts one handled file and shows its name.
    pub fn advance(&self, current: &str) {
        self.progress_bar.inc(1);
        self.progress_bar.set_message(current.to_string());
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    pub fn finish(&self, summary: &str) {
        self.progress_bar.finish_with_message(format!(
            "{}: {} in {}",
            self.label,
            summary,
            short_duration(self.started.elapsed())
        ));
    }

    pub fn abandon(&self, reason: &str) {
        self.progress_bar
            .abandon_with_message(format!("{}: {}", self.label, reason));
    }
}

fn short_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        secs if secs < 60 => format!("{}s", secs),
        secs => format!("{}m {}s", secs / 60, secs % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_manager_hides_bars() {
        let manager = ProgressManager::new(false);
        assert!(manager.bar(10, "slices").is_hidden());
        assert!(manager.spinner("Rewriting table").is_hidden());
        assert_eq!(manager.suspend(|| 5), 5);
    }

    #[test]
    fn test_short_duration() {
        assert_eq!(short_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(short_duration(Duration::from_secs(30)), "30s");
        assert_eq!(short_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_advance_counts_files() {
        let manager = ProgressManager::new(false);
        let progress = OperationProgress::new(&manager, "Moving", "slices", 3);

        progress.advance("volume_3_slice_0.h5");
        progress.advance("volume_3_slice_1.h5");
        assert_eq!(progress.position(), 2);
        progress.finish("2 slices moved");
    }
}
