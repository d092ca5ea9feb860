//! Garnishment order model and related types.
//!
//! This module defines [`GarnishmentOrder`] together with the closed set of
//! [`GarnishmentType`]s and the mutually exclusive [`GarnishmentAmount`].

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The legal category of a garnishment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarnishmentType {
    /// Court-ordered child support.
    ChildSupport,
    /// Tax levy issued by a taxing authority.
    TaxLevy,
    /// Ordinary creditor garnishment.
    Creditor,
    /// Any other garnishment.
    Other,
}

/// Which CCPA ceiling governs a garnishment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapCategory {
    /// Support orders, limited by the higher support ceiling.
    Support,
    /// Ordinary garnishments, limited by the general ceiling and the protected minimum.
    General,
}

impl GarnishmentType {
    /// Returns the CCPA ceiling category for this garnishment type.
    ///
    /// # Example
    ///
    /// ```
    /// use garnishment_engine::models::{CapCategory, GarnishmentType};
    ///
    /// assert_eq!(GarnishmentType::ChildSupport.cap_category(), CapCategory::Support);
    /// assert_eq!(GarnishmentType::TaxLevy.cap_category(), CapCategory::General);
    /// ```
    pub fn cap_category(self) -> CapCategory {
        match self {
            GarnishmentType::ChildSupport => CapCategory::Support,
            GarnishmentType::TaxLevy | GarnishmentType::Creditor | GarnishmentType::Other => {
                CapCategory::General
            }
        }
    }

    /// Returns the snake_case name used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            GarnishmentType::ChildSupport => "child_support",
            GarnishmentType::TaxLevy => "tax_levy",
            GarnishmentType::Creditor => "creditor",
            GarnishmentType::Other => "other",
        }
    }
}

impl fmt::Display for GarnishmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an order is currently enforceable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// The order is in force.
    #[default]
    Active,
    /// The order has been released or suspended.
    Inactive,
}

/// How much an order asks for each pay period.
///
/// Exactly one of a fixed currency amount or a percentage of disposable
/// earnings. The percentage is expressed in whole percent (50 = 50%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarnishmentAmount {
    /// A fixed amount per pay period.
    Fixed(Decimal),
    /// A percentage of the original disposable earnings.
    Percentage(Decimal),
}

impl GarnishmentAmount {
    /// Builds an amount from the two optional fields of an order record.
    ///
    /// Fails unless exactly one of `fixed` and `percentage` is set, the fixed
    /// amount is positive, and the percentage lies in `(0, 100]`.
    ///
    /// # Example
    ///
    /// ```
    /// use garnishment_engine::models::GarnishmentAmount;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = GarnishmentAmount::from_parts("garn-1", None, Some(Decimal::new(50, 0))).unwrap();
    /// assert_eq!(amount, GarnishmentAmount::Percentage(Decimal::new(50, 0)));
    ///
    /// assert!(GarnishmentAmount::from_parts("garn-2", None, None).is_err());
    /// ```
    pub fn from_parts(
        order_id: &str,
        fixed: Option<Decimal>,
        percentage: Option<Decimal>,
    ) -> EngineResult<Self> {
        let amount = match (fixed, percentage) {
            (Some(_), Some(_)) => {
                return Err(invalid_order(order_id, "both fixed and percentage amounts are set"));
            }
            (None, None) => {
                return Err(invalid_order(order_id, "neither fixed nor percentage amount is set"));
            }
            (Some(amount), None) => GarnishmentAmount::Fixed(amount),
            (None, Some(pct)) => GarnishmentAmount::Percentage(pct),
        };
        amount.validate(order_id)?;
        Ok(amount)
    }

    /// Checks that a fixed amount is positive and a percentage lies in `(0, 100]`.
    ///
    /// Amounts built directly from the enum variants skip [`Self::from_parts`];
    /// payroll input validation runs this check on every order.
    pub fn validate(&self, order_id: &str) -> EngineResult<()> {
        match *self {
            GarnishmentAmount::Fixed(amount) if amount <= Decimal::ZERO => {
                Err(invalid_order(order_id, "fixed amount must be positive"))
            }
            GarnishmentAmount::Percentage(pct) if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED => {
                Err(invalid_order(
                    order_id,
                    "percentage must be greater than 0 and at most 100",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Returns the percentage if this is a percentage-based amount.
    pub fn percentage(&self) -> Option<Decimal> {
        match self {
            GarnishmentAmount::Fixed(_) => None,
            GarnishmentAmount::Percentage(pct) => Some(*pct),
        }
    }
}

fn invalid_order(order_id: &str, message: &str) -> EngineError {
    EngineError::InvalidGarnishmentOrder {
        order_id: order_id.to_string(),
        message: message.to_string(),
    }
}

/// A wage garnishment order served on the employer.
///
/// Orders are deserialized from records carrying `amount_fixed` and
/// `amount_percentage` as separate optional fields; a record with neither or
/// both is rejected during deserialization.
///
/// # Example
///
/// ```
/// use garnishment_engine::models::{GarnishmentAmount, GarnishmentOrder, GarnishmentType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let order = GarnishmentOrder::new(
///     "garn-1",
///     GarnishmentType::ChildSupport,
///     GarnishmentAmount::Percentage(Decimal::new(50, 0)),
///     1,
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// );
/// assert!(order.is_applicable_on(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GarnishmentOrderRecord", into = "GarnishmentOrderRecord")]
pub struct GarnishmentOrder {
    /// Unique identifier for the order.
    pub id: String,
    /// The legal category of the order.
    pub garnishment_type: GarnishmentType,
    /// Name of the creditor or agency receiving payment.
    pub creditor_name: Option<String>,
    /// Issuing authority's order number.
    pub order_number: Option<String>,
    /// Court case number.
    pub case_number: Option<String>,
    /// Amount requested per pay period.
    pub amount: GarnishmentAmount,
    /// Processing priority; lower values are serviced first.
    pub priority: i32,
    /// First date the order is enforceable.
    pub effective_date: NaiveDate,
    /// Last date the order is enforceable, if it expires.
    pub expiry_date: Option<NaiveDate>,
    /// Whether the order is in force.
    pub status: OrderStatus,
}

impl GarnishmentOrder {
    /// Creates an active, open-ended order.
    ///
    /// The amount is not checked here; [`PayrollCalculationInput::validate`](super::PayrollCalculationInput::validate)
    /// rejects out-of-range amounts before any calculation.
    pub fn new(
        id: impl Into<String>,
        garnishment_type: GarnishmentType,
        amount: GarnishmentAmount,
        priority: i32,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            garnishment_type,
            creditor_name: None,
            order_number: None,
            case_number: None,
            amount,
            priority,
            effective_date,
            expiry_date: None,
            status: OrderStatus::Active,
        }
    }

    /// Sets the expiry date.
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Sets the order status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the creditor name.
    pub fn with_creditor(mut self, creditor_name: impl Into<String>) -> Self {
        self.creditor_name = Some(creditor_name.into());
        self
    }

    /// Returns true if the order is active and its window covers `date`.
    ///
    /// Both ends of the window are inclusive.
    pub fn is_applicable_on(&self, date: NaiveDate) -> bool {
        self.status == OrderStatus::Active
            && date >= self.effective_date
            && self.expiry_date.is_none_or(|expiry| date <= expiry)
    }
}

/// Filters `orders` down to those applicable on `pay_date`, preserving input order.
///
/// The engine itself assumes it only receives applicable orders; this helper
/// is for the payroll run that selects them.
pub fn applicable_orders(orders: &[GarnishmentOrder], pay_date: NaiveDate) -> Vec<GarnishmentOrder> {
    orders
        .iter()
        .filter(|order| order.is_applicable_on(pay_date))
        .cloned()
        .collect()
}

/// Wire representation of a garnishment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GarnishmentOrderRecord {
    id: String,
    #[serde(rename = "type")]
    garnishment_type: GarnishmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creditor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    case_number: Option<String>,
    #[serde(default)]
    amount_fixed: Option<Decimal>,
    #[serde(default)]
    amount_percentage: Option<Decimal>,
    priority: i32,
    effective_date: NaiveDate,
    #[serde(default)]
    expiry_date: Option<NaiveDate>,
    #[serde(default)]
    status: OrderStatus,
}

impl TryFrom<GarnishmentOrderRecord> for GarnishmentOrder {
    type Error = EngineError;

    fn try_from(record: GarnishmentOrderRecord) -> Result<Self, Self::Error> {
        let amount =
            GarnishmentAmount::from_parts(&record.id, record.amount_fixed, record.amount_percentage)?;

        Ok(Self {
            id: record.id,
            garnishment_type: record.garnishment_type,
            creditor_name: record.creditor_name,
            order_number: record.order_number,
            case_number: record.case_number,
            amount,
            priority: record.priority,
            effective_date: record.effective_date,
            expiry_date: record.expiry_date,
            status: record.status,
        })
    }
}

impl From<GarnishmentOrder> for GarnishmentOrderRecord {
    fn from(order: GarnishmentOrder) -> Self {
        let (amount_fixed, amount_percentage) = match order.amount {
            GarnishmentAmount::Fixed(amount) => (Some(amount), None),
            GarnishmentAmount::Percentage(pct) => (None, Some(pct)),
        };

        Self {
            id: order.id,
            garnishment_type: order.garnishment_type,
            creditor_name: order.creditor_name,
            order_number: order.order_number,
            case_number: order.case_number,
            amount_fixed,
            amount_percentage,
            priority: order.priority,
            effective_date: order.effective_date,
            expiry_date: order.expiry_date,
            status: order.status,
        }
    }
}
