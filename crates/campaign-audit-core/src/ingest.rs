use crate::dates;
use crate::error::Error;
use crate::model::{
    CampaignRow, CampaignTable, BOOKED_IMPRESSIONS, CREATED_TIME, DELIVERED_IMPRESSIONS,
    GOAL_END_DATE, GOAL_START_DATE, LEAD_ID, LINE_ITEM_ID, PAGE, PROPERTY, REQUIRED_COLUMNS,
};
use ahash::AHashMap;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Positions of the required columns in the uploaded header row.
struct ColumnIndex {
    positions: AHashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, Error> {
        let mut positions = AHashMap::new();
        let mut missing = Vec::new();

        for column in REQUIRED_COLUMNS {
            match headers.iter().position(|h| h == column) {
                Some(pos) => {
                    positions.insert(column, pos);
                }
                None => missing.push(column.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }
        Ok(Self { positions })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &'static str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&pos| record.get(pos))
            .unwrap_or("")
    }
}

/// Raw text of the three date columns for one row, parsed column-wise later.
struct RawDates {
    goal_start_date: String,
    goal_end_date: String,
    created_time: String,
}

/// Read an uploaded campaign export.
///
/// Fails on a missing required column or an unusable impressions value.
/// Unparseable dates are not errors: they become `None` and are reported
/// once per column in `CampaignTable::warnings`.
pub fn read_campaign_csv<R: Read>(reader: R) -> Result<CampaignTable, Error> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut raw_dates = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row_number = i + 1;

        rows.push(CampaignRow {
            lead_id: index.get(&record, LEAD_ID).trim().to_string(),
            line_item_id: index.get(&record, LINE_ITEM_ID).trim().to_string(),
            page: index.get(&record, PAGE).trim().to_string(),
            property: index.get(&record, PROPERTY).trim().to_string(),
            booked_impressions: parse_impressions(
                index.get(&record, BOOKED_IMPRESSIONS),
                row_number,
                BOOKED_IMPRESSIONS,
            )?,
            delivered_impressions: parse_impressions(
                index.get(&record, DELIVERED_IMPRESSIONS),
                row_number,
                DELIVERED_IMPRESSIONS,
            )?,
            goal_start_date: None,
            goal_end_date: None,
            created_time: None,
        });
        raw_dates.push(RawDates {
            goal_start_date: index.get(&record, GOAL_START_DATE).to_string(),
            goal_end_date: index.get(&record, GOAL_END_DATE).to_string(),
            created_time: index.get(&record, CREATED_TIME).to_string(),
        });
    }
    debug!("Read {} campaign rows", rows.len());

    let mut warnings = Vec::new();

    let (starts, warning) =
        dates::normalize_column(GOAL_START_DATE, raw_dates.iter().map(|d| &d.goal_start_date));
    warnings.extend(warning);
    let (ends, warning) =
        dates::normalize_column(GOAL_END_DATE, raw_dates.iter().map(|d| &d.goal_end_date));
    warnings.extend(warning);
    let (created, warning) =
        dates::normalize_column(CREATED_TIME, raw_dates.iter().map(|d| &d.created_time));
    warnings.extend(warning);

    for (row, ((start, end), created)) in rows
        .iter_mut()
        .zip(starts.into_iter().zip(ends).zip(created))
    {
        row.goal_start_date = start;
        row.goal_end_date = end;
        row.created_time = created;
    }

    info!(
        "Ingested {} rows ({} date column warning(s))",
        rows.len(),
        warnings.len()
    );
    Ok(CampaignTable { rows, warnings })
}

pub fn read_campaign_csv_path<P: AsRef<Path>>(path: P) -> Result<CampaignTable, Error> {
    let file = File::open(path.as_ref())?;
    read_campaign_csv(file)
}

/// Parse a non-negative impression count.
///
/// Accepts thousands separators and integral decimals such as `500000.0`.
pub fn parse_impressions(raw: &str, row: usize, column: &str) -> Result<u64, Error> {
    let processing = |message: String| Error::Processing {
        row,
        column: column.to_string(),
        message,
    };

    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(processing("value is empty".to_string()));
    }

    if let Ok(value) = cleaned.parse::<u64>() {
        return Ok(value);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            Err(processing(format!("'{}' is not a finite number", raw.trim())))
        }
        Ok(value) if value < 0.0 => Err(processing(format!(
            "impressions cannot be negative, got {}",
            raw.trim()
        ))),
        Ok(value) if value.fract() != 0.0 => Err(processing(format!(
            "impressions must be a whole number, got {}",
            raw.trim()
        ))),
        Ok(value) if value > u64::MAX as f64 => {
            Err(processing(format!("'{}' is too large", raw.trim())))
        }
        Ok(value) => Ok(value as u64),
        Err(_) => Err(processing(format!("'{}' is not a number", raw.trim()))),
    }
}

/// A minimal well-formed upload, shown to users who need the expected layout.
pub const SAMPLE_CSV: &str = "\
Lead ID,Line item ID,Page,Property,Booked Impressions,Delivered Impressions,Goal Start Date,Goal End Date,Created Time
L001,LI001,Homepage,Website A,500000,450000,13-01-2025,31-01-2025,25-12-2024
L002,LI002,Article,Website B,700000,600000,15-01-2025,15-02-2025,14-01-2025
L003,LI003,Homepage,Website A,400000,350000,01-02-2025,28-02-2025,30-01-2025
";
