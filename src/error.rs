//! Error types for PPC bid optimization.

use rust_decimal::Decimal;

/// A record or configuration value failed a numeric invariant.
///
/// Raised at batch level: one bad record rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// More clicks than impressions.
    #[error("target {target_id}: clicks ({clicks}) exceed impressions ({impressions})")]
    ClicksExceedImpressions {
        target_id: String,
        clicks: u64,
        impressions: u64,
    },

    /// A currency field holds a negative amount.
    #[error("target {target_id}: {field} must not be negative (got {value})")]
    NegativeAmount {
        target_id: String,
        field: &'static str,
        value: Decimal,
    },

    /// A derived ratio or bid does not fit in a `Decimal`.
    #[error("target {target_id}: {field} is out of range")]
    ValueOutOfRange {
        target_id: String,
        field: &'static str,
    },

    /// Two records in one batch share an id.
    #[error("duplicate target id in batch: {target_id}")]
    DuplicateTarget { target_id: String },

    /// Target ACOS must be strictly positive.
    #[error("target ACOS must be greater than zero (got {0})")]
    NonPositiveTargetAcos(Decimal),

    /// Average order value must be strictly positive.
    #[error("average order value must be greater than zero (got {0})")]
    NonPositiveAverageOrderValue(Decimal),

    /// A bid policy constant is out of range.
    #[error("invalid bid policy: {reason}")]
    InvalidPolicy { reason: String },
}

/// The uploaded file could not be turned into a batch.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("uploaded file is not valid target data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("average order value for product {product_id} must be greater than zero")]
    InvalidAverageOrderValue { product_id: String },
}

/// Errors from the advertising API.
#[derive(Debug, thiserror::Error)]
pub enum AdsError {
    /// The API could not be reached or answered with a failure.
    #[error("ads API request failed: {reason}")]
    RequestFailed { reason: String },

    /// The fetched targets could not be optimized.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error(transparent)]
    Policy(#[from] ValidationError),
}

/// The HTTP server failed to start or stopped unexpectedly.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error(transparent)]
    Policy(ValidationError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
