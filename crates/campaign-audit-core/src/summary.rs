use crate::flags::fill_rate;
use crate::model::{FlaggedRow, OVERBOOKING, SLA_BREACH, UNDERDELIVERY};

/// Headline metrics for the whole upload.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSummary {
    pub total_campaigns: usize,
    pub overbooking_count: usize,
    pub underdelivery_count: usize,
    pub sla_breach_count: usize,
    pub total_booked: u64,
    pub total_delivered: u64,
    /// Delivered as a percentage of booked, 0 when nothing was booked.
    pub fill_rate: f64,
}

impl CampaignSummary {
    pub fn from_rows(rows: &[FlaggedRow]) -> Self {
        let total_booked = rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.row.booked_impressions));
        let total_delivered = rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.row.delivered_impressions));

        Self {
            total_campaigns: rows.len(),
            overbooking_count: rows.iter().filter(|r| r.overbooking).count(),
            underdelivery_count: rows.iter().filter(|r| r.underdelivery).count(),
            sla_breach_count: rows.iter().filter(|r| r.sla_breach).count(),
            total_booked,
            total_delivered,
            fill_rate: fill_rate(total_booked, total_delivered),
        }
    }

    /// Distance from full delivery in percentage points; `None` when exactly
    /// on target.
    pub fn fill_rate_delta(&self) -> Option<f64> {
        if self.fill_rate == 100.0 {
            None
        } else {
            Some(self.fill_rate - 100.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueCount {
    pub issue: &'static str,
    pub true_count: usize,
    pub false_count: usize,
    /// Share of all rows with the flag set, in percent.
    pub true_percent: f64,
}

/// True/false breakdown of each flag across the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueDistribution {
    pub issues: Vec<IssueCount>,
}

impl IssueDistribution {
    pub fn from_rows(rows: &[FlaggedRow]) -> Self {
        let total = rows.len();
        let count = |issue: &'static str, flag: fn(&FlaggedRow) -> bool| {
            let true_count = rows.iter().filter(|r| flag(r)).count();
            IssueCount {
                issue,
                true_count,
                false_count: total - true_count,
                true_percent: if total == 0 {
                    0.0
                } else {
                    true_count as f64 / total as f64 * 100.0
                },
            }
        };

        Self {
            issues: vec![
                count(OVERBOOKING, |r| r.overbooking),
                count(UNDERDELIVERY, |r| r.underdelivery),
                count(SLA_BREACH, |r| r.sla_breach),
            ],
        }
    }
}
