use std::fs;
use std::io::Cursor;

use campaign_audit_core::export::{
    read_flagged_csv, ExportedRow, write_flagged_csv, write_rollup_csv,
};
use campaign_audit_core::flags::apply_flags;
use campaign_audit_core::ingest::{read_campaign_csv, read_campaign_csv_path, SAMPLE_CSV};
use campaign_audit_core::model::{CampaignRow, OUTPUT_COLUMNS};
use campaign_audit_core::rollup::Dimension;
use campaign_audit_core::{AnalysisEngine, Error, FlagThresholds, SilentReporter};
use chrono::NaiveDate;
use tempfile::tempdir;

const HEADER: &str = "Lead ID,Line item ID,Page,Property,Booked Impressions,Delivered Impressions,Goal Start Date,Goal End Date,Created Time";

fn csv_with_rows(rows: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

fn analyze(csv: &str) -> Result<campaign_audit_core::AnalysisReport, Error> {
    AnalysisEngine::new(FlagThresholds::default())
        .analyze_reader(Cursor::new(csv.as_bytes()), &SilentReporter)
}

#[test]
fn test_full_pipeline_from_file() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("campaigns.csv");
    fs::write(
        &input,
        csv_with_rows(&[
            "L001,LI001,Homepage,Website A,900000,900000,13-01-2025,31-01-2025,01-01-2025",
            "L002,LI002,Homepage,Website A,700000,700000,2025-01-13,2025-01-31,2025-01-02",
            "L003,LI003,Article,Website B,500000,400000,13-01-2025,31-01-2025,01-01-2025",
            "L004,LI004,Article,Website B,500000,500000,13-01-2025,31-01-2025,20-01-2025",
        ]),
    )
    .unwrap();

    let engine = AnalysisEngine::new(FlagThresholds::default());
    let report = engine.analyze_path(&input, &SilentReporter).unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.rows.len(), 4);

    // Mixed day-first and ISO dates normalize into the same slot.
    assert!(report.rows[0].overbooking);
    assert!(report.rows[1].overbooking);
    assert!(!report.rows[2].overbooking);

    // 400,000 < 450,000 breaches through the delivery clause.
    assert!(report.rows[2].underdelivery);
    assert!(report.rows[2].sla_breach);

    // Created after the goal start breaches through the lateness clause.
    assert!(!report.rows[3].underdelivery);
    assert!(report.rows[3].sla_breach);

    assert_eq!(report.summary.total_campaigns, 4);
    assert_eq!(report.summary.overbooking_count, 2);
    assert_eq!(report.summary.underdelivery_count, 1);
    assert_eq!(report.summary.sla_breach_count, 2);
    assert_eq!(report.by_page.len(), 2);
    assert_eq!(report.rollup(Dimension::Property).len(), 2);
}

#[test]
fn test_sample_csv_is_valid_input() {
    let report = analyze(SAMPLE_CSV).unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.rows.len(), 3);
    // L001 delivered exactly 90% and was booked before its start.
    assert!(!report.rows[0].sla_breach);
    // L002 delivered 600,000 of 700,000 (85.7%).
    assert!(report.rows[1].sla_breach);
    // L003 delivered 350,000 of 400,000 (87.5%).
    assert!(report.rows[2].sla_breach);
}

#[test]
fn test_missing_columns_fail_with_schema_error() {
    let csv = "Lead ID,Page,Property,Booked Impressions\nL001,Home,A,100\n";
    match analyze(csv) {
        Err(Error::Schema { missing }) => {
            assert_eq!(
                missing,
                vec![
                    "Line item ID",
                    "Delivered Impressions",
                    "Goal Start Date",
                    "Goal End Date",
                    "Created Time",
                ]
            );
        }
        other => panic!("expected schema error, got {:?}", other.map(|r| r.rows.len())),
    }
}

#[test]
fn test_schema_error_message_lists_expected_columns() {
    let err = analyze("Lead ID\nL001\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Created Time"));
    assert!(message.contains("Expected columns: Lead ID, Line item ID"));
    assert!(err.is_input_error());
}

#[test]
fn test_non_numeric_impressions_fail_the_pipeline() {
    let csv = csv_with_rows(&[
        "L001,LI001,Home,A,100,100,13-01-2025,31-01-2025,01-01-2025",
        "L002,LI002,Home,A,lots,100,13-01-2025,31-01-2025,01-01-2025",
    ]);
    match analyze(&csv) {
        Err(Error::Processing { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "Booked Impressions");
        }
        other => panic!("expected processing error, got {:?}", other.map(|r| r.rows.len())),
    }
}

#[test]
fn test_negative_and_fractional_impressions_are_rejected() {
    let negative = csv_with_rows(&["L001,LI001,Home,A,100,-5,13-01-2025,31-01-2025,01-01-2025"]);
    assert!(matches!(analyze(&negative), Err(Error::Processing { .. })));

    let fractional =
        csv_with_rows(&["L001,LI001,Home,A,100.5,100,13-01-2025,31-01-2025,01-01-2025"]);
    assert!(matches!(analyze(&fractional), Err(Error::Processing { .. })));
}

#[test]
fn test_impressions_accept_separators_and_integral_decimals() {
    let csv = csv_with_rows(&[
        "L001,LI001,Home,A,\"1,500,001\",1500000.0,13-01-2025,31-01-2025,01-01-2025",
    ]);
    let report = analyze(&csv).unwrap();
    assert_eq!(report.rows[0].row.booked_impressions, 1_500_001);
    assert_eq!(report.rows[0].row.delivered_impressions, 1_500_000);
    assert!(report.rows[0].overbooking);
}

#[test]
fn test_unparseable_dates_warn_without_failing() {
    let csv = csv_with_rows(&[
        "L001,LI001,Home,A,100,100,someday,31-01-2025,20-01-2025",
        "L002,LI002,Home,A,100,100,13-01-2025,31-01-2025,",
        "L003,LI003,Home,A,100,100,13-01-2025,31-01-2025,01-01-2025",
    ]);
    let report = analyze(&csv).unwrap();

    let columns: Vec<(&str, usize)> = report
        .warnings
        .iter()
        .map(|w| (w.column.as_str(), w.unparsed))
        .collect();
    assert_eq!(columns, vec![("Goal Start Date", 1), ("Created Time", 1)]);

    assert_eq!(report.rows[0].row.goal_start_date, None);
    assert_eq!(report.rows[1].row.created_time, None);
    // Neither row can be late without both dates.
    assert!(!report.rows[0].sla_breach);
    assert!(!report.rows[1].sla_breach);
}

#[test]
fn test_headers_are_trimmed_and_extra_columns_ignored() {
    let csv = "Notes, Created Time ,Goal End Date,Goal Start Date,Delivered Impressions,Booked Impressions,Property,Page,Line item ID,Lead ID\n\
               ignored,01-01-2025,31-01-2025,13-01-2025,10,20,Website A,Homepage,LI9,L9\n";
    let table = read_campaign_csv(Cursor::new(csv)).unwrap();
    let row = &table.rows[0];
    assert_eq!(row.lead_id, "L9");
    assert_eq!(row.page, "Homepage");
    assert_eq!(row.booked_impressions, 20);
    assert_eq!(row.delivered_impressions, 10);
    assert_eq!(row.goal_start_date, NaiveDate::from_ymd_opt(2025, 1, 13));
}

#[test]
fn test_empty_table_produces_empty_report() {
    let report = analyze(&csv_with_rows(&[])).unwrap();
    assert!(report.rows.is_empty());
    assert_eq!(report.summary.fill_rate, 0.0);
    assert!(report.by_page.is_empty());
}

#[test]
fn test_thresholds_are_threaded_through_engine() {
    let csv = csv_with_rows(&["L001,LI001,Home,A,1000,850,13-01-2025,31-01-2025,01-01-2025"]);

    let strict = AnalysisEngine::new(FlagThresholds {
        capacity: 999,
        sla_threshold_percent: 90.0,
    })
    .analyze_reader(Cursor::new(csv.as_bytes()), &SilentReporter)
    .unwrap();
    assert!(strict.rows[0].overbooking);
    assert!(strict.rows[0].sla_breach);

    let lenient = AnalysisEngine::new(FlagThresholds {
        capacity: 1000,
        sla_threshold_percent: 80.0,
    })
    .analyze_reader(Cursor::new(csv.as_bytes()), &SilentReporter)
    .unwrap();
    assert!(!lenient.rows[0].overbooking);
    assert!(!lenient.rows[0].sla_breach);
}

#[test]
fn test_export_round_trip_reproduces_flags() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("campaign_analysis_output.csv");

    let csv = csv_with_rows(&[
        "L001,LI001,Homepage,Website A,900000,900000,13-01-2025,31-01-2025,01-01-2025",
        "L002,LI002,Homepage,Website A,700000,600000,13-01-2025,31-01-2025,02-01-2025",
        "L003,LI003,Article,Website B,500000,500000,13-01-2025,31-01-2025,20-01-2025",
        "L004,LI004,Article,Website C,400000,380000,13-01-2025,31-01-2025,01-01-2025",
    ]);
    let report = analyze(&csv).unwrap();
    assert!(report.rows.iter().any(|r| r.overbooking));
    // L003 delivered in full, so only the lateness clause can breach it.
    assert!(!report.rows[2].underdelivery && report.rows[2].sla_breach);

    write_flagged_csv(fs::File::create(&output).unwrap(), &report.rows).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, OUTPUT_COLUMNS.join(","));
    assert!(text.contains("L001,LI001,Homepage,Website A,900000,900000,True,False,False"));
    assert!(text.contains("L003,LI003,Article,Website B,500000,500000,False,False,True"));

    let exported = read_flagged_csv(fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(exported.len(), report.rows.len());

    // Rebuild the table from the exported numbers and the original dates.
    let rebuilt: Vec<CampaignRow> = exported
        .iter()
        .zip(&report.rows)
        .map(|(exported, original)| CampaignRow {
            lead_id: exported.lead_id.clone(),
            line_item_id: exported.line_item_id.clone(),
            page: exported.page.clone(),
            property: exported.property.clone(),
            booked_impressions: exported.booked_impressions,
            delivered_impressions: exported.delivered_impressions,
            goal_start_date: original.row.goal_start_date,
            goal_end_date: original.row.goal_end_date,
            created_time: original.row.created_time,
        })
        .collect();
    let recomputed = apply_flags(rebuilt, &FlagThresholds::default());

    for ((exported, original), again) in exported.iter().zip(&report.rows).zip(&recomputed) {
        assert_eq!(exported, &ExportedRow::from(original));
        assert_eq!(
            (again.overbooking, again.underdelivery, again.sla_breach),
            (exported.overbooking, exported.underdelivery, exported.sla_breach),
            "flags differ for {}",
            exported.lead_id
        );
    }
}

#[test]
fn test_huge_impression_counts_do_not_overflow() {
    let csv = csv_with_rows(&[
        "L001,LI001,Homepage,Website A,10000000000000000000,0,13-01-2025,31-01-2025,01-01-2025",
        "L002,LI002,Homepage,Website A,10000000000000000000,0,13-01-2025,31-01-2025,01-01-2025",
    ]);
    let report = analyze(&csv).unwrap();
    assert!(report.rows.iter().all(|r| r.overbooking));
    assert_eq!(report.summary.total_booked, u64::MAX);
    assert_eq!(report.by_page[0].booked_impressions, u64::MAX);
}

#[test]
fn test_rollup_export() {
    let report = analyze(SAMPLE_CSV).unwrap();
    let mut buffer = Vec::new();
    write_rollup_csv(&mut buffer, Dimension::Page, &report.by_page).unwrap();

    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Page,Booked Impressions,Delivered Impressions,Campaign Count,Overbooking Rate,Underdelivery Rate,SLA Breach Rate,Fill Rate"
    );
    assert_eq!(lines[1], "Article,700000,600000,1,0.00,100.00,100.00,85.71");
    assert_eq!(lines[2], "Homepage,900000,800000,2,0.00,100.00,50.00,88.89");
}

#[test]
fn test_read_campaign_csv_path_missing_file() {
    let tmp = tempdir().unwrap();
    let err = read_campaign_csv_path(tmp.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_input_error());
}
