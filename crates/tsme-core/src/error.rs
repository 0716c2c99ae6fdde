//! Error types for tsme-core.

/// Result type for tsme-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while validating calendar values or decoding portal payloads.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Month label did not name one of the twelve French months.
    #[error("unknown month name: {0}")]
    UnknownMonth(String),

    /// A "Month Year" or "dd/mm/yyyy" label could not be parsed.
    #[error("invalid date label: {0}")]
    InvalidDateLabel(String),

    /// Year/month pair outside the calendar.
    #[error("invalid year/month: {year}-{month}")]
    InvalidYearMonth {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// A payload row did not have the expected shape.
    #[error("malformed row {index}: {reason}")]
    MalformedRow {
        /// Position of the row in the payload.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The payload was not a JSON array, or was too short.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
