use thiserror::Error;

/// Reasons `partition` refuses its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionError {
    /// The side budget is negative, NaN or infinite.
    #[error("side budget must be a finite, non-negative number of seconds (got {budget})")]
    InvalidBudget { budget: f64 },

    /// A track reported a negative, NaN or infinite duration.
    #[error("track {index} has an invalid duration of {duration_ms} ms")]
    InvalidDuration { index: usize, duration_ms: f64 },

    /// A track has no known duration at all.
    #[error("track {index} has no duration")]
    MissingDuration { index: usize },
}
