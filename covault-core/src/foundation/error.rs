use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    ConfigError,
    CohortUnavailable,
    DerivationError,
    MissingAuthorization,
    UpstreamUnavailable,
    SigningFailed,
    RelaySubmission,
    SettlementTimeout,
    EncodingError,
    SerializationError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CovaultError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("cohort unavailable: {details}")]
    CohortUnavailable { details: String },

    #[error("account derivation failed: {0}")]
    DerivationError(String),

    #[error("missing interaction proof; refusing to request a cohort signature")]
    MissingAuthorization,

    #[error("upstream {endpoint} unavailable: {details}")]
    UpstreamUnavailable { endpoint: String, details: String },

    #[error("cohort signing failed: {0}")]
    SigningFailed(String),

    #[error("relay rejected operation: {details}")]
    RelaySubmission { details: String },

    #[error("settlement not observed for operation {operation_hash} after {waited_secs}s")]
    SettlementTimeout { operation_hash: String, waited_secs: u64 },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, CovaultError>;

impl CovaultError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CovaultError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            CovaultError::ConfigError(_) => ErrorCode::ConfigError,
            CovaultError::CohortUnavailable { .. } => ErrorCode::CohortUnavailable,
            CovaultError::DerivationError(_) => ErrorCode::DerivationError,
            CovaultError::MissingAuthorization => ErrorCode::MissingAuthorization,
            CovaultError::UpstreamUnavailable { .. } => ErrorCode::UpstreamUnavailable,
            CovaultError::SigningFailed(_) => ErrorCode::SigningFailed,
            CovaultError::RelaySubmission { .. } => ErrorCode::RelaySubmission,
            CovaultError::SettlementTimeout { .. } => ErrorCode::SettlementTimeout,
            CovaultError::EncodingError(_) => ErrorCode::EncodingError,
            CovaultError::SerializationError { .. } => ErrorCode::SerializationError,
            CovaultError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    /// Whether a caller-side retry of the whole request could succeed.
    ///
    /// Validation and configuration failures are terminal until the input or
    /// deployment changes; the rest are transient upstream conditions.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::UpstreamUnavailable
                | ErrorCode::CohortUnavailable
                | ErrorCode::RelaySubmission
                | ErrorCode::SettlementTimeout
                | ErrorCode::SigningFailed
        )
    }

    pub fn upstream(endpoint: impl Into<String>, details: impl std::fmt::Display) -> Self {
        CovaultError::UpstreamUnavailable { endpoint: endpoint.into(), details: details.to_string() }
    }
}

impl From<hex::FromHexError> for CovaultError {
    fn from(err: hex::FromHexError) -> Self {
        CovaultError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for CovaultError {
    fn from(err: toml::de::Error) -> Self {
        CovaultError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_json::Error> for CovaultError {
    fn from(err: serde_json::Error) -> Self {
        CovaultError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<io::Error> for CovaultError {
    fn from(err: io::Error) -> Self {
        CovaultError::Message(err.to_string())
    }
}

// NOTE: reqwest errors are converted at the call site so the failing endpoint
// name lands in `UpstreamUnavailable` instead of a bare message.
