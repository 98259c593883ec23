use crate::model::REQUIRED_COLUMNS;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(
        "Missing required column(s): {}. Expected columns: {}",
        missing.join(", "),
        REQUIRED_COLUMNS.join(", ")
    )]
    Schema { missing: Vec<String> },

    #[error("Row {row}, column '{column}': {message}")]
    Processing {
        row: usize,
        column: String,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors caused by the shape or content of the uploaded table,
    /// as opposed to IO or configuration failures.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Schema { .. } | Error::Processing { .. } | Error::Csv(_)
        )
    }
}
