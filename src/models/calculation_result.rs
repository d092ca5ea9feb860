//! Payroll calculation result models.
//!
//! This module contains the [`PayrollCalculationResult`] type and the
//! breakdown structures that make every figure in it auditable, including
//! the [`AuditTrace`] of rule applications.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{GarnishmentType, PayFrequency};

/// A garnishment amount actually withheld for one order.
///
/// # Example
///
/// ```
/// use garnishment_engine::models::{GarnishmentDeduction, GarnishmentType};
/// use rust_decimal::Decimal;
///
/// let deduction = GarnishmentDeduction {
///     id: "garn-1".to_string(),
///     garnishment_type: GarnishmentType::ChildSupport,
///     amount: Decimal::new(78280, 2),
///     percentage: Some(Decimal::new(50, 0)),
///     priority: 1,
/// };
/// assert_eq!(deduction.amount.to_string(), "782.80");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarnishmentDeduction {
    /// The ID of the order this deduction satisfies.
    pub id: String,
    /// The legal category of the order.
    #[serde(rename = "type")]
    pub garnishment_type: GarnishmentType,
    /// The amount withheld this period.
    pub amount: Decimal,
    /// The order's requested percentage, for percentage-based orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    /// The order's priority.
    pub priority: i32,
}

/// Federal income tax withholding sub-totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalWithholdingBreakdown {
    /// Gross pay multiplied by periods per year.
    pub annualized_gross: Decimal,
    /// Which deduction was applied ("standard" or "itemized").
    pub deduction_kind: String,
    /// The annual deduction subtracted from annualized gross.
    pub deduction_applied: Decimal,
    /// Annualized gross less the deduction, floored at zero.
    pub taxable_income: Decimal,
    /// Tax on the taxable income from the bracket table.
    pub annual_tax: Decimal,
    /// Annual tax divided by periods per year, rounded to the cent.
    pub period_tax: Decimal,
    /// Additional flat withholding from the tax election.
    pub extra_withholding: Decimal,
    /// Total federal withholding for the period.
    pub tax: Decimal,
    /// Federal withholding as a percentage of gross pay (e.g., "14.07%").
    pub effective_rate: String,
}

/// Social Security and Medicare sub-totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaBreakdown {
    /// Wages this period subject to Social Security.
    pub social_security_taxable_wages: Decimal,
    /// Social Security tax withheld.
    pub social_security_tax: Decimal,
    /// The annual wage base in force.
    pub social_security_wage_base: Decimal,
    /// Regular Medicare tax withheld.
    pub medicare_tax: Decimal,
    /// Wages this period subject to the additional Medicare surtax.
    pub additional_medicare_taxable_wages: Decimal,
    /// Additional Medicare surtax withheld.
    pub additional_medicare_tax: Decimal,
}

/// State income tax sub-totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxBreakdown {
    /// The state code the tax was resolved for.
    pub state: String,
    /// The applied rate (e.g., "4%").
    pub rate: String,
    /// State tax withheld.
    pub amount: Decimal,
}

/// Local occupational tax sub-totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTaxBreakdown {
    /// The applied rate (e.g., "2.2%").
    pub rate: String,
    /// The city whose rate was applied, "default" for the fallback, or "N/A".
    pub city: String,
    /// Local tax withheld.
    pub amount: Decimal,
}

/// Garnishment apportionment sub-totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarnishmentBreakdown {
    /// Deductions in processing order.
    pub order: Vec<GarnishmentDeduction>,
    /// Sum of all deductions.
    pub total_amount: Decimal,
    /// Whether the total stays within the applicable CCPA ceiling.
    pub ccpa_compliant: bool,
    /// The ceiling the compliance check measured against (e.g., "65%").
    pub ccpa_limit: String,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The statute or publication the rule comes from.
    pub authority: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results that need human review but do not stop the
/// calculation, such as garnishments exceeding the CCPA ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use garnishment_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Human-auditable breakdown of a payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// The pay frequency used for annualization.
    pub pay_frequency: PayFrequency,
    /// Federal withholding detail.
    pub federal_withholding: FederalWithholdingBreakdown,
    /// FICA detail.
    pub fica_taxes: FicaBreakdown,
    /// State tax detail.
    pub state_tax: StateTaxBreakdown,
    /// Local tax detail.
    pub local_tax: LocalTaxBreakdown,
    /// Gross pay less all mandatory withholdings.
    pub disposable_earnings: Decimal,
    /// Garnishment detail.
    pub garnishments: GarnishmentBreakdown,
    /// Pay remaining after withholdings and garnishments.
    pub net_pay: Decimal,
    /// Every rule applied, in order.
    pub audit_trace: AuditTrace,
}

/// The complete result of a payroll calculation.
///
/// `net_pay` always equals `max(0, gross_pay - total_mandatory_deductions -
/// total_garnishments)`, `total_mandatory_deductions` equals the sum of the
/// six withholding fields, and `total_garnishments` equals the sum of
/// `garnishments_applied`. All amounts are rounded to the cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculationResult {
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Federal income tax withheld.
    pub federal_income_tax: Decimal,
    /// Social Security tax withheld.
    pub social_security_tax: Decimal,
    /// Regular Medicare tax withheld.
    pub medicare_tax: Decimal,
    /// Additional Medicare surtax withheld.
    pub additional_medicare_tax: Decimal,
    /// State income tax withheld.
    pub state_tax: Decimal,
    /// Local occupational tax withheld.
    pub local_tax: Decimal,
    /// Sum of all mandatory withholdings.
    pub total_mandatory_deductions: Decimal,
    /// Gross pay less mandatory withholdings, floored at zero.
    pub disposable_earnings: Decimal,
    /// Garnishment deductions in processing order.
    pub garnishments_applied: Vec<GarnishmentDeduction>,
    /// Sum of all garnishment deductions.
    pub total_garnishments: Decimal,
    /// Pay remaining after withholdings and garnishments.
    pub net_pay: Decimal,
    /// Auditable breakdown of every figure above.
    pub breakdown: PayrollBreakdown,
}

impl PayrollCalculationResult {
    /// Returns the sum of the six itemized withholding figures.
    pub fn itemized_withholding_total(&self) -> Decimal {
        self.federal_income_tax
            + self.social_security_tax
            + self.medicare_tax
            + self.additional_medicare_tax
            + self.state_tax
            + self.local_tax
    }
}
