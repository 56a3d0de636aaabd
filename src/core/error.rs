use chrono::NaiveDate;

/// The request cannot start: nothing has been sent upstream.
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    #[error("the start date ({first_day}) must be before the end date ({last_day})")]
    InvertedRange { first_day: NaiveDate, last_day: NaiveDate },

    #[error("the end date ({last_day}) is in the future (today is {today})")]
    FutureDate { last_day: NaiveDate, today: NaiveDate },

    #[error("midnight of {0} does not exist in the API time zone")]
    NonexistentMidnight(NaiveDate),
}

/// The upstream API call failed.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("the request failed: {0}")]
    Transport(#[from] ureq::Error),

    #[error("the API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Non-fatal findings of the transform.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Warning {
    /// The column key is not the expected `(plant, fuel type, metric)` composite,
    /// so the columns were left unmodified.
    #[error("unexpected column key levels ({n_levels:?}), the columns are left as is")]
    SchemaAssumption { n_levels: Option<usize> },

    /// Dropping the metric level produced the same `(plant, fuel type)` pair more than once.
    #[error("{n_duplicates} columns repeat a plant and fuel type")]
    DuplicateColumns { n_duplicates: usize },
}
