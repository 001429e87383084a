//! Error types for utility functions.

use tessera_primitives::SeriesError;

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Date cell could not be parsed.
    #[error("invalid date at row {row}: {value}")]
    InvalidDate {
        /// Zero-based data row.
        row: usize,
        /// Raw cell content.
        value: String,
    },

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Rows do not form a valid series.
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    /// File could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UtilsError::MissingColumn("close".to_string());
        assert!(err.to_string().contains("close"));

        let err = UtilsError::InvalidDate { row: 3, value: "2024-13-01".to_string() };
        assert_eq!(err.to_string(), "invalid date at row 3: 2024-13-01");
    }
}
