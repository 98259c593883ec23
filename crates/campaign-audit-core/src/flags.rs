use crate::model::{CampaignRow, FlaggedRow, GroupKey};
use ahash::AHashMap;
use tracing::debug;

pub const DEFAULT_CAPACITY: u64 = 1_500_000;
pub const DEFAULT_SLA_THRESHOLD_PERCENT: f64 = 90.0;

/// Thresholds applied by the flag engine, passed explicitly to every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagThresholds {
    /// Impressions a single slot can carry.
    pub capacity: u64,
    /// Minimum delivered share of booked impressions, in percent.
    pub sla_threshold_percent: f64,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            sla_threshold_percent: DEFAULT_SLA_THRESHOLD_PERCENT,
        }
    }
}

/// Sum booked impressions per slot and flag every slot whose total strictly
/// exceeds `capacity`.
///
/// Slot totals saturate at `u64::MAX`.
pub fn compute_overbooking(rows: &[CampaignRow], capacity: u64) -> AHashMap<GroupKey, bool> {
    let mut booked_by_slot: AHashMap<GroupKey, u64> = AHashMap::new();
    for row in rows {
        let booked = booked_by_slot.entry(row.group_key()).or_insert(0);
        *booked = booked.saturating_add(row.booked_impressions);
    }

    booked_by_slot
        .into_iter()
        .map(|(key, booked)| (key, booked > capacity))
        .collect()
}

pub fn compute_underdelivery(row: &CampaignRow) -> bool {
    row.delivered_impressions < row.booked_impressions
}

/// A row breaches its SLA when delivery falls below the threshold share of
/// the booking, or when the booking was created after its goal period began.
///
/// A missing created or start date never triggers the lateness clause.
pub fn compute_sla_breach(row: &CampaignRow, sla_threshold_percent: f64) -> bool {
    // delivered < pct/100 * booked, both sides scaled by 100.
    let under_threshold = (row.delivered_impressions as f64) * 100.0
        < sla_threshold_percent * row.booked_impressions as f64;

    let created_late = match (row.created_time, row.goal_start_date) {
        (Some(created), Some(start)) => created > start,
        _ => false,
    };

    under_threshold || created_late
}

/// Compute all three flags for every row, preserving row order.
///
/// Overbooking is computed once per slot and then looked up for each row,
/// so every row in a slot carries the same value.
pub fn apply_flags(rows: Vec<CampaignRow>, thresholds: &FlagThresholds) -> Vec<FlaggedRow> {
    let overbooked = compute_overbooking(&rows, thresholds.capacity);
    debug!(
        "{} slots, {} overbooked",
        overbooked.len(),
        overbooked.values().filter(|v| **v).count()
    );

    rows.into_iter()
        .map(|row| {
            let overbooking = overbooked.get(&row.group_key()).copied().unwrap_or(false);
            let underdelivery = compute_underdelivery(&row);
            let sla_breach = compute_sla_breach(&row, thresholds.sla_threshold_percent);
            FlaggedRow {
                row,
                overbooking,
                underdelivery,
                sla_breach,
            }
        })
        .collect()
}

/// Delivered as a percentage of booked; 0 when nothing was booked.
pub fn fill_rate(booked: u64, delivered: u64) -> f64 {
    if booked == 0 {
        0.0
    } else {
        delivered as f64 / booked as f64 * 100.0
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
