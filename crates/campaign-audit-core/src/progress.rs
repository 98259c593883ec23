use crate::model::DateWarning;

/// Trait for reporting analysis progress.
///
/// The CLI implements it with indicatif spinners; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_ingest_start(&self) {}
    fn on_ingest_complete(&self, _rows: usize, _duration_secs: f64) {}
    fn on_date_warning(&self, _warning: &DateWarning) {}
    fn on_flags_start(&self) {}
    fn on_flags_complete(&self, _flagged_rows: usize, _duration_secs: f64) {}
    fn on_rollup_start(&self) {}
    fn on_rollup_complete(&self, _groups: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
