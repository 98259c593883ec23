use crate::error::Error;
use crate::flags::{self, FlagThresholds};
use crate::ingest;
use crate::model::{DateWarning, FlaggedRow};
use crate::progress::ProgressReporter;
use crate::rollup::{self, Dimension, DimensionSummary};
use crate::summary::{CampaignSummary, IssueDistribution};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct AnalysisEngine {
    thresholds: FlagThresholds,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseDurations {
    pub ingest: Duration,
    pub flags: Duration,
    pub rollup: Duration,
}

/// Everything derived from one upload. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub thresholds: FlagThresholds,
    pub rows: Vec<FlaggedRow>,
    pub warnings: Vec<DateWarning>,
    pub summary: CampaignSummary,
    pub distribution: IssueDistribution,
    pub by_page: Vec<DimensionSummary>,
    pub by_property: Vec<DimensionSummary>,
    pub durations: PhaseDurations,
}

impl AnalysisReport {
    pub fn rollup(&self, dimension: Dimension) -> &[DimensionSummary] {
        match dimension {
            Dimension::Page => &self.by_page,
            Dimension::Property => &self.by_property,
        }
    }
}

impl AnalysisEngine {
    pub fn new(thresholds: FlagThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze_path<P: AsRef<Path>>(
        &self,
        path: P,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisReport, Error> {
        info!("Analyzing {}", path.as_ref().display());
        let file = File::open(path.as_ref())?;
        self.analyze_reader(file, reporter)
    }

    /// Run the full pipeline:
    /// 1. Ingest the table and normalize date columns
    /// 2. Compute per-row flags and per-slot overbooking
    /// 3. Summarize and roll up by page and property
    ///
    /// Fatal input problems abort before anything is returned.
    pub fn analyze_reader<R: Read>(
        &self,
        reader: R,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisReport, Error> {
        // Phase 1: Ingest
        reporter.on_ingest_start();
        let ingest_start = Instant::now();
        let table = ingest::read_campaign_csv(reader)?;
        let ingest_duration = ingest_start.elapsed();
        reporter.on_ingest_complete(table.rows.len(), ingest_duration.as_secs_f64());
        for warning in &table.warnings {
            reporter.on_date_warning(warning);
        }

        // Phase 2: Flags
        reporter.on_flags_start();
        let flags_start = Instant::now();
        let rows = flags::apply_flags(table.rows, &self.thresholds);
        let flags_duration = flags_start.elapsed();
        reporter.on_flags_complete(rows.len(), flags_duration.as_secs_f64());
        debug!(
            "Flags computed in {:.3}s with capacity {} and SLA threshold {}%",
            flags_duration.as_secs_f64(),
            self.thresholds.capacity,
            self.thresholds.sla_threshold_percent,
        );

        // Phase 3: Summary and rollups
        reporter.on_rollup_start();
        let rollup_start = Instant::now();
        let summary = CampaignSummary::from_rows(&rows);
        let distribution = IssueDistribution::from_rows(&rows);
        let by_page = rollup::rollup(&rows, Dimension::Page);
        let by_property = rollup::rollup(&rows, Dimension::Property);
        let rollup_duration = rollup_start.elapsed();
        reporter.on_rollup_complete(
            by_page.len() + by_property.len(),
            rollup_duration.as_secs_f64(),
        );

        info!(
            "{} campaigns: {} overbooked, {} underdelivered, {} SLA breaches, fill rate {:.2}%",
            summary.total_campaigns,
            summary.overbooking_count,
            summary.underdelivery_count,
            summary.sla_breach_count,
            summary.fill_rate,
        );

        Ok(AnalysisReport {
            thresholds: self.thresholds,
            rows,
            warnings: table.warnings,
            summary,
            distribution,
            by_page,
            by_property,
            durations: PhaseDurations {
                ingest: ingest_duration,
                flags: flags_duration,
                rollup: rollup_duration,
            },
        })
    }
}
