//! Error types for the Garnishment Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for the input-contract violations and configuration failures that can
//! occur before or during a payroll calculation.

use thiserror::Error;

/// The main error type for the Garnishment Engine.
///
/// Arithmetic inside the calculators is total; every variant here describes
/// either malformed caller data or a rate table that could not be loaded.
///
/// # Example
///
/// ```
/// use garnishment_engine::error::EngineError;
///
/// let error = EngineError::JurisdictionNotFound {
///     state: "ZZ".to_string(),
/// };
/// assert_eq!(error.to_string(), "Jurisdiction not found in rate table: ZZ");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but describes an unusable rate table.
    #[error("Invalid rate table: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// A filing status string did not match any known filing status.
    #[error("Unknown filing status: {value}")]
    UnknownFilingStatus {
        /// The value that could not be recognised.
        value: String,
    },

    /// The work state has no entry in the jurisdiction table.
    #[error("Jurisdiction not found in rate table: {state}")]
    JurisdictionNotFound {
        /// The state code that was looked up.
        state: String,
    },

    /// The pay-period length does not map to a supported pay frequency.
    #[error("Unsupported pay period length: {days} days")]
    UnsupportedPayPeriod {
        /// The pay-period length supplied by the caller.
        days: u32,
    },

    /// A garnishment order carried an invalid amount.
    #[error("Invalid garnishment order '{order_id}': {message}")]
    InvalidGarnishmentOrder {
        /// The ID of the offending order.
        order_id: String,
        /// A description of what made the order invalid.
        message: String,
    },

    /// A calculation input field was out of range.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
