use crate::flags::{fill_rate, round2};
use crate::model::{FlaggedRow, PAGE, PROPERTY};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Page,
    Property,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::Page, Dimension::Property];

    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Page => PAGE,
            Dimension::Property => PROPERTY,
        }
    }

    fn value_of<'a>(&self, row: &'a FlaggedRow) -> &'a str {
        match self {
            Dimension::Page => &row.row.page,
            Dimension::Property => &row.row.property,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Per-value summary for one dimension. Rates and fill rate are percentages
/// rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSummary {
    pub value: String,
    pub booked_impressions: u64,
    pub delivered_impressions: u64,
    pub campaign_count: usize,
    pub overbooking_rate: f64,
    pub underdelivery_rate: f64,
    pub sla_breach_rate: f64,
    /// 0 when the group booked nothing.
    pub fill_rate: f64,
}

#[derive(Default)]
struct Accumulator {
    booked: u64,
    delivered: u64,
    count: usize,
    overbooking: usize,
    underdelivery: usize,
    sla_breach: usize,
}

impl Accumulator {
    fn add(&mut self, row: &FlaggedRow) {
        self.booked = self.booked.saturating_add(row.row.booked_impressions);
        self.delivered = self.delivered.saturating_add(row.row.delivered_impressions);
        self.count += 1;
        self.overbooking += row.overbooking as usize;
        self.underdelivery += row.underdelivery as usize;
        self.sla_breach += row.sla_breach as usize;
    }

    fn rate(&self, flagged: usize) -> f64 {
        round2(flagged as f64 / self.count as f64 * 100.0)
    }

    fn finish(self, value: String) -> DimensionSummary {
        DimensionSummary {
            value,
            booked_impressions: self.booked,
            delivered_impressions: self.delivered,
            campaign_count: self.count,
            overbooking_rate: self.rate(self.overbooking),
            underdelivery_rate: self.rate(self.underdelivery),
            sla_breach_rate: self.rate(self.sla_breach),
            fill_rate: round2(fill_rate(self.booked, self.delivered)),
        }
    }
}

/// Group flagged rows by `dimension`, one summary per distinct value in
/// ascending order.
pub fn rollup(rows: &[FlaggedRow], dimension: Dimension) -> Vec<DimensionSummary> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in rows {
        groups.entry(dimension.value_of(row)).or_default().add(row);
    }

    groups
        .into_iter()
        .map(|(value, acc)| acc.finish(value.to_string()))
        .collect()
}
