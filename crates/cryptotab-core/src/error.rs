use thiserror::Error;

use crate::ProviderId;

/// Validation and contract errors exposed by `cryptotab-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid source '{value}', expected one of coinmarketcap, defillama")]
    InvalidSource { value: String },

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,
    #[error("listing_limit must be within 1..=5000, got {value}")]
    InvalidListingLimit { value: u32 },
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("time_period cannot be empty")]
    EmptyTimePeriod,

    #[error("row has {actual} values but the table declares {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },
    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("{actual} configuration cannot drive a {expected} handler")]
    ProviderMismatch {
        expected: ProviderId,
        actual: ProviderId,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
