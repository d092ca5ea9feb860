//! Payroll calculation input and pay frequency.
//!
//! This module contains the [`PayrollCalculationInput`] consumed by the
//! orchestrator, the [`WorkJurisdiction`] it is taxed in, and the
//! [`PayFrequency`] convention used for annualization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{GarnishmentOrder, TaxElection};

/// The pay frequency implied by a pay-period length.
///
/// Federal and state annualization and the CCPA protected minimum all use
/// the same periods-per-year figure taken from this value.
///
/// | Period length (days) | Frequency     | Periods per year |
/// |----------------------|---------------|------------------|
/// | 7                    | Weekly        | 52               |
/// | 14                   | Biweekly      | 26               |
/// | 15                   | Semi-monthly  | 24               |
/// | 28–31                | Monthly       | 12               |
///
/// # Example
///
/// ```
/// use garnishment_engine::models::PayFrequency;
/// use rust_decimal::Decimal;
///
/// let frequency = PayFrequency::from_period_days(7).unwrap();
/// assert_eq!(frequency, PayFrequency::Weekly);
/// assert_eq!(frequency.periods_per_year(), Decimal::new(52, 0));
/// assert!(PayFrequency::from_period_days(10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Paid every week.
    Weekly,
    /// Paid every other week.
    Biweekly,
    /// Paid twice a month.
    SemiMonthly,
    /// Paid once a month.
    Monthly,
}

impl PayFrequency {
    /// Maps a pay-period length in days to a pay frequency.
    pub fn from_period_days(days: u32) -> EngineResult<Self> {
        match days {
            7 => Ok(PayFrequency::Weekly),
            14 => Ok(PayFrequency::Biweekly),
            15 => Ok(PayFrequency::SemiMonthly),
            28..=31 => Ok(PayFrequency::Monthly),
            _ => Err(EngineError::UnsupportedPayPeriod { days }),
        }
    }

    /// Returns the number of pay periods in a year.
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            PayFrequency::Weekly => Decimal::new(52, 0),
            PayFrequency::Biweekly => Decimal::new(26, 0),
            PayFrequency::SemiMonthly => Decimal::new(24, 0),
            PayFrequency::Monthly => Decimal::new(12, 0),
        }
    }

    /// Converts a per-period amount to an annual amount.
    pub fn annualize(&self, amount: Decimal) -> Decimal {
        amount * self.periods_per_year()
    }

    /// Converts an annual amount to a per-period amount (unrounded).
    pub fn deannualize(&self, amount: Decimal) -> Decimal {
        amount / self.periods_per_year()
    }
}

/// The state (and optionally city) where the work is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkJurisdiction {
    /// Two-letter state code (e.g., "KY").
    pub state: String,
    /// City for local occupational tax, if any.
    #[serde(default)]
    pub city: Option<String>,
}

impl WorkJurisdiction {
    /// Creates a jurisdiction with no city.
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            city: None,
        }
    }

    /// Creates a jurisdiction with a city.
    pub fn city(state: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            city: Some(city.into()),
        }
    }
}

fn default_pay_period_days() -> u32 {
    7
}

/// Everything needed to compute one worker's pay for one period.
///
/// The caller is responsible for passing only garnishment orders that are
/// active and in their effective window on the pay date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculationInput {
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// The worker's withholding elections.
    pub tax_election: TaxElection,
    /// Garnishment orders to apportion, in the caller's order.
    #[serde(default)]
    pub garnishment_orders: Vec<GarnishmentOrder>,
    /// Length of the pay period in days.
    #[serde(default = "default_pay_period_days")]
    pub pay_period_days: u32,
    /// Where the work is performed.
    pub jurisdiction: WorkJurisdiction,
    /// Gross pay already paid this calendar year, before this period.
    #[serde(default)]
    pub ytd_gross: Decimal,
}

/// Largest monetary input the engine accepts, ten to the fifteenth dollars.
///
/// Annualizing and summing inputs up to this bound stays well inside the
/// range of `Decimal`.
pub const MAX_MONETARY_INPUT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn check_amount(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: "must not be negative".to_string(),
        });
    }
    if value > MAX_MONETARY_INPUT {
        return Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: format!("must not exceed {}", MAX_MONETARY_INPUT),
        });
    }
    Ok(())
}

impl PayrollCalculationInput {
    /// Checks the input contract and resolves the pay frequency.
    ///
    /// Monetary fields must lie in `[0, MAX_MONETARY_INPUT]`, and every
    /// garnishment order's amount must satisfy the rules of
    /// [`GarnishmentAmount::from_parts`](super::GarnishmentAmount::from_parts).
    pub fn validate(&self) -> EngineResult<PayFrequency> {
        check_amount("gross_pay", self.gross_pay)?;
        check_amount("ytd_gross", self.ytd_gross)?;
        check_amount(
            "tax_election.additional_withholding",
            self.tax_election.additional_withholding,
        )?;
        check_amount("tax_election.deductions", self.tax_election.deductions)?;
        for order in &self.garnishment_orders {
            order.amount.validate(&order.id)?;
        }
        PayFrequency::from_period_days(self.pay_period_days)
    }
}
