//! Error Types for the Analytics Engine

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid total supply {0}: must be at least 1")]
    InvalidSupply(Decimal),

    #[error("invalid horizon {0} months: must not be negative")]
    InvalidHorizon(i64),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("numeric overflow while computing {0}")]
    NumericOverflow(&'static str),
}
