use crate::error::Error;
use crate::ingest::parse_impressions;
use crate::model::{
    FlaggedRow, BOOKED_IMPRESSIONS, DELIVERED_IMPRESSIONS, OUTPUT_COLUMNS, OVERBOOKING,
    SLA_BREACH, UNDERDELIVERY,
};
use crate::rollup::{Dimension, DimensionSummary};
use csv::{ReaderBuilder, Trim, Writer};
use std::io::{Read, Write};

pub const DEFAULT_OUTPUT_FILE: &str = "campaign_analysis_output.csv";

/// One line of an exported flagged table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRow {
    pub lead_id: String,
    pub line_item_id: String,
    pub page: String,
    pub property: String,
    pub booked_impressions: u64,
    pub delivered_impressions: u64,
    pub overbooking: bool,
    pub underdelivery: bool,
    pub sla_breach: bool,
}

impl From<&FlaggedRow> for ExportedRow {
    fn from(flagged: &FlaggedRow) -> Self {
        Self {
            lead_id: flagged.row.lead_id.clone(),
            line_item_id: flagged.row.line_item_id.clone(),
            page: flagged.row.page.clone(),
            property: flagged.row.property.clone(),
            booked_impressions: flagged.row.booked_impressions,
            delivered_impressions: flagged.row.delivered_impressions,
            overbooking: flagged.overbooking,
            underdelivery: flagged.underdelivery,
            sla_breach: flagged.sla_breach,
        }
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn parse_bool(raw: &str, row: usize, column: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Processing {
            row,
            column: column.to_string(),
            message: format!("'{}' is not a boolean", other),
        }),
    }
}

/// Write the flagged table in display column order.
pub fn write_flagged_csv<W: Write>(writer: W, rows: &[FlaggedRow]) -> Result<(), Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(OUTPUT_COLUMNS)?;

    for flagged in rows {
        let row = &flagged.row;
        let booked = row.booked_impressions.to_string();
        let delivered = row.delivered_impressions.to_string();
        wtr.write_record([
            row.lead_id.as_str(),
            row.line_item_id.as_str(),
            row.page.as_str(),
            row.property.as_str(),
            booked.as_str(),
            delivered.as_str(),
            format_bool(flagged.overbooking),
            format_bool(flagged.underdelivery),
            format_bool(flagged.sla_breach),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a table previously written by [`write_flagged_csv`].
pub fn read_flagged_csv<R: Read>(reader: R) -> Result<Vec<ExportedRow>, Error> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let missing: Vec<String> = OUTPUT_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::Schema { missing });
    }
    let position = |column: &str| headers.iter().position(|h| h == column).unwrap_or(0);
    let [lead, line_item, page, property, booked, delivered, over, under, sla] =
        OUTPUT_COLUMNS.map(position);

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row_number = i + 1;
        let field = |pos: usize| record.get(pos).unwrap_or("");

        rows.push(ExportedRow {
            lead_id: field(lead).to_string(),
            line_item_id: field(line_item).to_string(),
            page: field(page).to_string(),
            property: field(property).to_string(),
            booked_impressions: parse_impressions(field(booked), row_number, BOOKED_IMPRESSIONS)?,
            delivered_impressions: parse_impressions(
                field(delivered),
                row_number,
                DELIVERED_IMPRESSIONS,
            )?,
            overbooking: parse_bool(field(over), row_number, OVERBOOKING)?,
            underdelivery: parse_bool(field(under), row_number, UNDERDELIVERY)?,
            sla_breach: parse_bool(field(sla), row_number, SLA_BREACH)?,
        });
    }

    Ok(rows)
}

/// Header of a rollup export; the first column is named after the dimension.
pub fn rollup_headers(dimension: Dimension) -> [&'static str; 8] {
    [
        dimension.column(),
        BOOKED_IMPRESSIONS,
        DELIVERED_IMPRESSIONS,
        "Campaign Count",
        "Overbooking Rate",
        "Underdelivery Rate",
        "SLA Breach Rate",
        "Fill Rate",
    ]
}

pub fn write_rollup_csv<W: Write>(
    writer: W,
    dimension: Dimension,
    summaries: &[DimensionSummary],
) -> Result<(), Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(rollup_headers(dimension))?;

    for summary in summaries {
        wtr.write_record([
            summary.value.clone(),
            summary.booked_impressions.to_string(),
            summary.delivered_impressions.to_string(),
            summary.campaign_count.to_string(),
            format!("{:.2}", summary.overbooking_rate),
            format!("{:.2}", summary.underdelivery_rate),
            format!("{:.2}", summary.sla_breach_rate),
            format!("{:.2}", summary.fill_rate),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
