use thiserror::Error;

/// Failures while ingesting the historical tagged-returns table. All of
/// these are raised at load time, before any simulation starts.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("row {row}: expected 9 fields, found {found}")]
    FieldCount { row: usize, found: usize },

    #[error("row {row}: column {column} is not numeric: {value:?}")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: tag must be a single symbol A-F, found {value:?}")]
    BadTag { row: usize, value: String },

    #[error("symbol must be one of A-F, found {found:?}")]
    BadSymbol { found: char },

    #[error("pattern must not be empty")]
    EmptyPattern,

    #[error("row {row}: pattern width {found} does not match width {expected} of earlier rows")]
    PatternWidthMismatch {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("history contains no observations")]
    Empty,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Failures while running the projection itself.
#[derive(Debug, Error)]
pub enum SimError {
    /// The pattern was never observed historically and neither was its
    /// final symbol. Only possible with a corrupt or empty history; the
    /// run aborts rather than inventing a return.
    #[error("no historical returns for pattern {pattern:?} or tag {tag}")]
    UnresolvableBin { pattern: String, tag: char },

    #[error("generations must be at least 1")]
    ZeroGenerations,

    #[error("starting pattern width {found} does not match index pattern width {expected}")]
    PatternWidthMismatch { found: usize, expected: usize },
}
