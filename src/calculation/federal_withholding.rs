//! Federal income tax withholding calculation.
//!
//! This module implements the annualized percentage method: gross pay is
//! annualized, reduced by the filing-status deduction, run through the
//! progressive bracket table, then de-annualized back to the pay period.

use rust_decimal::Decimal;

use crate::config::{FederalTaxConfig, TaxBracket};
use crate::models::{AuditStep, FederalWithholdingBreakdown, PayFrequency, TaxElection};

use super::currency::{format_ratio, round_currency};

/// The result of calculating federal withholding for one pay period.
#[derive(Debug, Clone)]
pub struct FederalWithholdingResult {
    /// Total federal withholding for the period, including extra withholding.
    pub tax: Decimal,
    /// Sub-totals for the breakdown.
    pub breakdown: FederalWithholdingBreakdown,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes tax on `taxable_income` using a progressive bracket table.
///
/// Each bracket taxes the portion of income within `[min, max)` at its rate;
/// the walk stops at the first bracket the income does not reach. Income at
/// or below zero yields zero tax.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::progressive_tax;
/// use garnishment_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket { min: Decimal::ZERO, max: Some(Decimal::new(10000, 0)), rate: Decimal::new(10, 2) },
///     TaxBracket { min: Decimal::new(10000, 0), max: None, rate: Decimal::new(20, 2) },
/// ];
/// assert_eq!(progressive_tax(Decimal::new(15000, 0), &brackets), Decimal::new(2000, 0));
/// ```
pub fn progressive_tax(taxable_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        if taxable_income <= bracket.min {
            break;
        }
        let upper = match bracket.max {
            Some(max) => taxable_income.min(max),
            None => taxable_income,
        };
        tax += (upper - bracket.min) * bracket.rate;
    }

    tax
}

/// Calculates federal income tax withholding for one pay period.
///
/// # Arguments
///
/// * `gross_pay` - Gross pay for the period
/// * `election` - The worker's tax election
/// * `frequency` - Pay frequency used to annualize and de-annualize
/// * `config` - Federal bracket tables and standard deductions
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// The per-period tax (rounded to the cent, plus the election's flat
/// additional withholding), its breakdown, and an audit step.
///
/// When the election opts out of the standard deduction, the election's
/// `deductions` figure is used as an itemized deduction instead.
pub fn calculate_federal_withholding(
    gross_pay: Decimal,
    election: &TaxElection,
    frequency: PayFrequency,
    config: &FederalTaxConfig,
    step_number: u32,
) -> FederalWithholdingResult {
    let status = election.filing_status;
    let brackets = config.brackets.get(status);

    let (deduction_kind, deduction_applied) = if election.standard_deduction {
        ("standard", *config.standard_deductions.get(status))
    } else {
        ("itemized", election.deductions.max(Decimal::ZERO))
    };

    let annualized_gross = frequency.annualize(gross_pay);
    let taxable_income = (annualized_gross - deduction_applied).max(Decimal::ZERO);
    let annual_tax = progressive_tax(taxable_income, brackets);
    let period_tax = round_currency(frequency.deannualize(annual_tax));
    let extra_withholding = round_currency(election.additional_withholding.max(Decimal::ZERO));
    let tax = period_tax + extra_withholding;
    let effective_rate = format_ratio(tax, gross_pay);

    let audit_step = AuditStep {
        step_number,
        rule_id: "federal_income_tax".to_string(),
        rule_name: "Federal Income Tax Withholding".to_string(),
        authority: config.authority.clone(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "filing_status": status.as_str(),
            "pay_frequency": frequency,
            "periods_per_year": frequency.periods_per_year().to_string(),
            "deduction_kind": deduction_kind,
            "extra_withholding": extra_withholding.to_string()
        }),
        output: serde_json::json!({
            "annualized_gross": annualized_gross.normalize().to_string(),
            "deduction_applied": deduction_applied.normalize().to_string(),
            "taxable_income": taxable_income.normalize().to_string(),
            "annual_tax": annual_tax.normalize().to_string(),
            "period_tax": period_tax.to_string(),
            "tax": tax.to_string()
        }),
        reasoning: format!(
            "(${} annualized - ${} {} deduction) = ${} taxable; ${} annual tax / {} = ${} + ${} extra = ${}",
            annualized_gross.normalize(),
            deduction_applied.normalize(),
            deduction_kind,
            taxable_income.normalize(),
            annual_tax.normalize(),
            frequency.periods_per_year(),
            period_tax,
            extra_withholding,
            tax
        ),
    };

    FederalWithholdingResult {
        tax,
        breakdown: FederalWithholdingBreakdown {
            annualized_gross,
            deduction_kind: deduction_kind.to_string(),
            deduction_applied,
            taxable_income,
            annual_tax,
            period_tax,
            extra_withholding,
            tax,
            effective_rate,
        },
        audit_step,
    }
}
