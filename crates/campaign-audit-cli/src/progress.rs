use campaign_audit_core::model::DateWarning;
use campaign_audit_core::ProgressReporter;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter: one spinner per pipeline phase, replaced by a
/// check line when the phase completes.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_ingest_start(&self) {
        self.start_spinner("Reading campaign data...");
    }

    fn on_ingest_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_spinner();
        eprintln!(
            "  {} Read {} rows in {:.2}s",
            "✓".green(),
            rows,
            duration_secs
        );
    }

    fn on_date_warning(&self, warning: &DateWarning) {
        eprintln!("  {} {}", "!".yellow(), warning.to_string().yellow());
    }

    fn on_flags_start(&self) {
        self.start_spinner("Computing flags...");
    }

    fn on_flags_complete(&self, flagged_rows: usize, duration_secs: f64) {
        self.finish_spinner();
        eprintln!(
            "  {} Flagged {} rows in {:.2}s",
            "✓".green(),
            flagged_rows,
            duration_secs
        );
    }

    fn on_rollup_start(&self) {
        self.start_spinner("Aggregating by page and property...");
    }

    fn on_rollup_complete(&self, groups: usize, duration_secs: f64) {
        self.finish_spinner();
        eprintln!(
            "  {} Built {} rollup rows in {:.2}s",
            "✓".green(),
            groups,
            duration_secs
        );
    }
}
