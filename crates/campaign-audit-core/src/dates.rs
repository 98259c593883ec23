use crate::model::DateWarning;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Date formats with a month name, tried after the numeric shapes.
/// `%B` also accepts the three-letter abbreviation when parsing.
const TEXTUAL_FORMATS: [&str; 6] = [
    "%d %B %Y",
    "%d-%B-%Y",
    "%d/%B/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B, %Y",
];

/// Accepted input shapes, shown to the user when an upload is rejected.
pub const ACCEPTED_FORMATS: [(&str, &str); 3] = [
    ("DD-MM-YYYY", "13-01-2025"),
    ("MM-DD-YYYY", "01-13-2025"),
    ("YYYY-MM-DD", "2025-01-13"),
];

/// Parse a single raw date string.
///
/// Day-first wins when a numeric date is ambiguous (`05-03-2025` is 5 March);
/// month-first is only used when day-first cannot be a valid date
/// (`01-13-2025` is 13 January). A four-digit leading part is read as
/// year-month-day. Any time-of-day suffix is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let token = value
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or(value);

    parse_numeric(token).or_else(|| {
        TEXTUAL_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    })
}

fn parse_numeric(token: &str) -> Option<NaiveDate> {
    let separator = token.chars().find(|c| matches!(c, '-' | '/' | '.'))?;
    let parts: Vec<&str> = token.split(separator).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let numbers = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;

    if parts[0].len() == 4 {
        if parts[1].len() > 2 || parts[2].len() > 2 {
            return None;
        }
        return NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2]);
    }

    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }

    let year = match parts[2].len() {
        4 => numbers[2] as i32,
        2 => expand_two_digit_year(numbers[2]),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, numbers[1], numbers[0])
        .or_else(|| NaiveDate::from_ymd_opt(year, numbers[0], numbers[1]))
}

/// POSIX pivot: 69-99 is the 1900s, 00-68 the 2000s.
fn expand_two_digit_year(year: u32) -> i32 {
    if year >= 69 {
        1900 + year as i32
    } else {
        2000 + year as i32
    }
}

/// Normalize one date column.
///
/// The output has the same length as the input. Values that cannot be
/// parsed become `None`; if there is at least one, a warning naming the
/// column is returned alongside.
pub fn normalize_column<I, S>(column: &str, values: I) -> (Vec<Option<NaiveDate>>, Option<DateWarning>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed: Vec<Option<NaiveDate>> = values
        .into_iter()
        .map(|v| parse_date(v.as_ref()))
        .collect();

    let unparsed = parsed.iter().filter(|d| d.is_none()).count();
    debug!(
        "Normalized column '{}': {} values, {} unparsed",
        column,
        parsed.len(),
        unparsed
    );

    let warning = if unparsed > 0 {
        warn!("Some {} dates could not be parsed ({} values)", column, unparsed);
        Some(DateWarning {
            column: column.to_string(),
            unparsed,
        })
    } else {
        None
    };

    (parsed, warning)
}
