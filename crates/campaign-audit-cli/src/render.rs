use campaign_audit_core::dates::ACCEPTED_FORMATS;
use campaign_audit_core::export::format_bool;
use campaign_audit_core::model::{FlaggedRow, REQUIRED_COLUMNS};
use campaign_audit_core::rollup::{Dimension, DimensionSummary};
use campaign_audit_core::summary::{CampaignSummary, IssueDistribution};
use campaign_audit_core::AnalysisReport;
use colored::*;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FlaggedTableRow<'a> {
    #[tabled(rename = "Lead ID")]
    lead_id: &'a str,
    #[tabled(rename = "Line item ID")]
    line_item_id: &'a str,
    #[tabled(rename = "Page")]
    page: &'a str,
    #[tabled(rename = "Property")]
    property: &'a str,
    #[tabled(rename = "Booked Impressions")]
    booked: u64,
    #[tabled(rename = "Delivered Impressions")]
    delivered: u64,
    #[tabled(rename = "Overbooking")]
    overbooking: &'static str,
    #[tabled(rename = "Underdelivery")]
    underdelivery: &'static str,
    #[tabled(rename = "SLA_Breach")]
    sla_breach: &'static str,
}

impl<'a> From<&'a FlaggedRow> for FlaggedTableRow<'a> {
    fn from(flagged: &'a FlaggedRow) -> Self {
        Self {
            lead_id: &flagged.row.lead_id,
            line_item_id: &flagged.row.line_item_id,
            page: &flagged.row.page,
            property: &flagged.row.property,
            booked: flagged.row.booked_impressions,
            delivered: flagged.row.delivered_impressions,
            overbooking: format_bool(flagged.overbooking),
            underdelivery: format_bool(flagged.underdelivery),
            sla_breach: format_bool(flagged.sla_breach),
        }
    }
}

#[derive(Tabled)]
struct RollupTableRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Booked Impressions")]
    booked: u64,
    #[tabled(rename = "Delivered Impressions")]
    delivered: u64,
    #[tabled(rename = "Campaign Count")]
    count: usize,
    #[tabled(rename = "Overbooking Rate")]
    overbooking_rate: String,
    #[tabled(rename = "Underdelivery Rate")]
    underdelivery_rate: String,
    #[tabled(rename = "SLA Breach Rate")]
    sla_breach_rate: String,
    #[tabled(rename = "Fill Rate")]
    fill_rate: String,
}

impl From<&DimensionSummary> for RollupTableRow {
    fn from(summary: &DimensionSummary) -> Self {
        Self {
            value: summary.value.clone(),
            booked: summary.booked_impressions,
            delivered: summary.delivered_impressions,
            count: summary.campaign_count,
            overbooking_rate: format!("{:.2}%", summary.overbooking_rate),
            underdelivery_rate: format!("{:.2}%", summary.underdelivery_rate),
            sla_breach_rate: format!("{:.2}%", summary.sla_breach_rate),
            fill_rate: format!("{:.2}%", summary.fill_rate),
        }
    }
}

#[derive(Tabled)]
struct IssueTableRow {
    #[tabled(rename = "Issue Type")]
    issue: &'static str,
    #[tabled(rename = "True")]
    true_count: usize,
    #[tabled(rename = "False")]
    false_count: usize,
    #[tabled(rename = "% of Campaigns")]
    percent: String,
}

pub fn print_report(report: &AnalysisReport, limit: Option<usize>) {
    print_overall(&report.summary);
    print_metrics(&report.summary);
    print_flagged_rows(&report.rows, limit);
    print_distribution(&report.distribution);
    for dimension in Dimension::ALL {
        print_rollup(dimension, report.rollup(dimension));
    }
}

fn print_overall(summary: &CampaignSummary) {
    println!("\n{}", "Overall Campaign Performance".bold());
    let delta = match summary.fill_rate_delta() {
        Some(delta) if delta < 0.0 => format!("{:.2}%", delta).red(),
        Some(delta) => format!("+{:.2}%", delta).green(),
        None => "On Target".green(),
    };
    println!("  Overall Fill Rate: {:.2}% ({})", summary.fill_rate, delta);
}

fn print_metrics(summary: &CampaignSummary) {
    println!("\n{}", "Campaign Performance Metrics".bold());
    println!(
        "  Total Campaigns: {}   Overbooking Issues: {}   Underdelivery Issues: {}   SLA Breaches: {}",
        format!("{}", summary.total_campaigns).cyan(),
        format!("{}", summary.overbooking_count).red(),
        format!("{}", summary.underdelivery_count).red(),
        format!("{}", summary.sla_breach_count).red(),
    );
}

fn print_flagged_rows(rows: &[FlaggedRow], limit: Option<usize>) {
    println!("\n{}", "Campaign Data".bold());
    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    let table_rows: Vec<FlaggedTableRow> = rows.iter().take(shown).map(Into::into).collect();
    println!("{}", Table::new(table_rows).with(Style::rounded()));
    if shown < rows.len() {
        println!("  ... {} more row(s) in the exported file", rows.len() - shown);
    }
}

fn print_distribution(distribution: &IssueDistribution) {
    println!("\n{}", "Issue Distribution (True/False)".bold());
    let table_rows: Vec<IssueTableRow> = distribution
        .issues
        .iter()
        .map(|issue| IssueTableRow {
            issue: issue.issue,
            true_count: issue.true_count,
            false_count: issue.false_count,
            percent: format!("{:.2}%", issue.true_percent),
        })
        .collect();
    println!("{}", Table::new(table_rows).with(Style::rounded()));
}

fn print_rollup(dimension: Dimension, summaries: &[DimensionSummary]) {
    println!("\n{}", format!("{}-wise Analysis", dimension).bold());
    let table_rows: Vec<RollupTableRow> = summaries.iter().map(Into::into).collect();
    println!("{}", Table::new(table_rows).with(Style::rounded()));
}

/// Guidance printed when an upload is rejected.
pub fn print_input_guidance() {
    eprintln!("Please make sure your CSV file has the required columns:");
    for column in REQUIRED_COLUMNS {
        eprintln!("  - {}", column);
    }
    eprintln!("Dates should be in a standard format like:");
    for (format, example) in ACCEPTED_FORMATS {
        eprintln!("  - {} (e.g., {})", format, example);
    }
}
