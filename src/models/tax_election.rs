//! Tax election (W-4) model and filing status.
//!
//! This module defines the [`TaxElection`] struct and [`FilingStatus`] enum
//! that drive federal withholding and the additional Medicare threshold.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The worker's federal filing status.
///
/// Filing status selects the bracket table, the standard deduction and the
/// additional Medicare threshold. Parsing is strict: an unrecognised string
/// is an error rather than a silent fallback to `single`.
///
/// # Example
///
/// ```
/// use garnishment_engine::models::FilingStatus;
///
/// let status: FilingStatus = "head_of_household".parse().unwrap();
/// assert_eq!(status, FilingStatus::HeadOfHousehold);
/// assert!("widowed".parse::<FilingStatus>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    /// Single filer.
    Single,
    /// Married filing jointly.
    Married,
    /// Head of household.
    #[serde(alias = "hoh")]
    HeadOfHousehold,
}

impl FilingStatus {
    /// Returns the snake_case name used in configuration and audit output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::Married => "married",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(FilingStatus::Single),
            "married" => Ok(FilingStatus::Married),
            "head_of_household" | "hoh" => Ok(FilingStatus::HeadOfHousehold),
            _ => Err(EngineError::UnknownFilingStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A worker's withholding elections for a payroll run.
///
/// Supplied by onboarding before each run and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxElection {
    /// The federal filing status.
    pub filing_status: FilingStatus,
    /// Number of claimed dependents.
    #[serde(default)]
    pub dependents: u32,
    /// Whether the standard deduction applies. When false, `deductions` is used instead.
    #[serde(default = "default_true")]
    pub standard_deduction: bool,
    /// Flat extra amount withheld from every paycheck.
    #[serde(default)]
    pub additional_withholding: Decimal,
    /// Annualized income from this job.
    #[serde(default)]
    pub job_income: Decimal,
    /// Other annual income reported on the election.
    #[serde(default)]
    pub other_income: Decimal,
    /// Annual itemized deductions claimed on the election.
    #[serde(default)]
    pub deductions: Decimal,
}

fn default_true() -> bool {
    true
}

impl TaxElection {
    /// Creates an election with the standard deduction and no adjustments.
    ///
    /// # Example
    ///
    /// ```
    /// use garnishment_engine::models::{FilingStatus, TaxElection};
    /// use rust_decimal::Decimal;
    ///
    /// let election = TaxElection::standard(FilingStatus::Single);
    /// assert!(election.standard_deduction);
    /// assert_eq!(election.additional_withholding, Decimal::ZERO);
    /// ```
    pub fn standard(filing_status: FilingStatus) -> Self {
        Self {
            filing_status,
            dependents: 0,
            standard_deduction: true,
            additional_withholding: Decimal::ZERO,
            job_income: Decimal::ZERO,
            other_income: Decimal::ZERO,
            deductions: Decimal::ZERO,
        }
    }
}
