use chrono::NaiveDate;

pub const LEAD_ID: &str = "Lead ID";
pub const LINE_ITEM_ID: &str = "Line item ID";
pub const PAGE: &str = "Page";
pub const PROPERTY: &str = "Property";
pub const BOOKED_IMPRESSIONS: &str = "Booked Impressions";
pub const DELIVERED_IMPRESSIONS: &str = "Delivered Impressions";
pub const GOAL_START_DATE: &str = "Goal Start Date";
pub const GOAL_END_DATE: &str = "Goal End Date";
pub const CREATED_TIME: &str = "Created Time";

pub const OVERBOOKING: &str = "Overbooking";
pub const UNDERDELIVERY: &str = "Underdelivery";
pub const SLA_BREACH: &str = "SLA_Breach";

/// Columns that must be present in every uploaded table.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    LEAD_ID,
    LINE_ITEM_ID,
    PAGE,
    PROPERTY,
    BOOKED_IMPRESSIONS,
    DELIVERED_IMPRESSIONS,
    GOAL_START_DATE,
    GOAL_END_DATE,
    CREATED_TIME,
];

/// Columns parsed by the date normalizer.
pub const DATE_COLUMNS: [&str; 3] = [GOAL_START_DATE, GOAL_END_DATE, CREATED_TIME];

/// Column order of the flagged table, both rendered and exported.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    LEAD_ID,
    LINE_ITEM_ID,
    PAGE,
    PROPERTY,
    BOOKED_IMPRESSIONS,
    DELIVERED_IMPRESSIONS,
    OVERBOOKING,
    UNDERDELIVERY,
    SLA_BREACH,
];

/// One booking line from the uploaded export.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRow {
    pub lead_id: String,
    pub line_item_id: String,
    pub page: String,
    pub property: String,
    pub booked_impressions: u64,
    pub delivered_impressions: u64,
    pub goal_start_date: Option<NaiveDate>,
    pub goal_end_date: Option<NaiveDate>,
    pub created_time: Option<NaiveDate>,
}

impl CampaignRow {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            page: self.page.clone(),
            property: self.property.clone(),
            goal_start_date: self.goal_start_date,
            goal_end_date: self.goal_end_date,
        }
    }
}

/// An inventory slot: campaigns sharing a placement and a date window.
///
/// Missing dates are part of the key, so rows with an unparseable start or
/// end date still land in exactly one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub page: String,
    pub property: String,
    pub goal_start_date: Option<NaiveDate>,
    pub goal_end_date: Option<NaiveDate>,
}

/// A campaign row with its derived quality flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedRow {
    pub row: CampaignRow,
    pub overbooking: bool,
    pub underdelivery: bool,
    pub sla_breach: bool,
}

/// A date column in which some values could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWarning {
    pub column: String,
    pub unparsed: usize,
}

impl std::fmt::Display for DateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Some {} dates could not be parsed ({} value(s)). Please ensure dates are in a standard format.",
            self.column, self.unparsed
        )
    }
}

/// The uploaded table after ingest and date normalization.
#[derive(Debug, Clone, Default)]
pub struct CampaignTable {
    pub rows: Vec<CampaignRow>,
    pub warnings: Vec<DateWarning>,
}
