//! Payroll orchestration: gross pay to net pay.
//!
//! This module composes the withholding calculators and the garnishment
//! apportionment into one pure calculation and assembles the breakdown.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{ConfigLoader, TaxTables};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, FicaBreakdown, GarnishmentBreakdown, LocalTaxBreakdown, PayrollBreakdown,
    PayrollCalculationInput, PayrollCalculationResult, StateTaxBreakdown,
};

use super::currency::format_rate;
use super::federal_withholding::calculate_federal_withholding;
use super::fica::{calculate_medicare, calculate_social_security};
use super::garnishment::apportion_garnishments;
use super::state_local::{calculate_local_tax, calculate_state_tax};

/// Calculates one worker's pay for one period.
///
/// Runs federal, Social Security, Medicare, state and local withholding,
/// derives disposable earnings, apportions garnishments and assembles the
/// result. The function has no side effects beyond logging.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`](crate::error::EngineError::InvalidInput) for negative gross or YTD pay
/// - [`EngineError::UnsupportedPayPeriod`](crate::error::EngineError::UnsupportedPayPeriod) for an unmapped period length
/// - [`EngineError::JurisdictionNotFound`](crate::error::EngineError::JurisdictionNotFound) for a state missing from the tables
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::calculate_payroll;
/// use garnishment_engine::config::ConfigLoader;
/// use garnishment_engine::models::{
///     FilingStatus, PayrollCalculationInput, TaxElection, WorkJurisdiction,
/// };
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::embedded().unwrap();
/// let input = PayrollCalculationInput {
///     gross_pay: Decimal::new(2000, 0),
///     tax_election: TaxElection::standard(FilingStatus::Single),
///     garnishment_orders: vec![],
///     pay_period_days: 7,
///     jurisdiction: WorkJurisdiction::state("TN"),
///     ytd_gross: Decimal::ZERO,
/// };
///
/// let result = calculate_payroll(&input, config.tables()).unwrap();
/// assert_eq!(result.federal_income_tax, Decimal::new(28140, 2));
/// assert_eq!(result.net_pay, Decimal::new(156560, 2));
/// ```
pub fn calculate_payroll(
    input: &PayrollCalculationInput,
    tables: &TaxTables,
) -> EngineResult<PayrollCalculationResult> {
    let frequency = input.validate()?;
    let jurisdiction = tables.jurisdiction(&input.jurisdiction.state)?;
    let gross_pay = input.gross_pay;
    let election = &input.tax_election;

    let federal = calculate_federal_withholding(gross_pay, election, frequency, tables.federal(), 1);
    let social_security = calculate_social_security(gross_pay, input.ytd_gross, tables.fica(), 2);
    let medicare = calculate_medicare(
        gross_pay,
        election.filing_status,
        input.ytd_gross,
        tables.fica(),
        3,
    );
    let state = calculate_state_tax(gross_pay, &input.jurisdiction.state, jurisdiction, frequency, 4);
    let local = calculate_local_tax(gross_pay, jurisdiction, input.jurisdiction.city.as_deref(), 5);

    let total_mandatory_deductions = federal.tax
        + social_security.tax
        + medicare.regular_tax
        + medicare.additional_tax
        + state.amount
        + local.amount;
    let disposable_earnings = (gross_pay - total_mandatory_deductions).max(Decimal::ZERO);

    debug!(
        federal = %federal.tax,
        social_security = %social_security.tax,
        medicare = %medicare.regular_tax,
        additional_medicare = %medicare.additional_tax,
        state = %state.amount,
        local = %local.amount,
        disposable_earnings = %disposable_earnings,
        "Mandatory withholdings calculated"
    );

    let garnishments = apportion_garnishments(
        disposable_earnings,
        &input.garnishment_orders,
        tables.garnishment(),
        frequency,
        6,
    );
    let total_garnishments = garnishments.total;
    let net_pay = (gross_pay - total_mandatory_deductions - total_garnishments).max(Decimal::ZERO);

    info!(
        gross_pay = %gross_pay,
        total_mandatory_deductions = %total_mandatory_deductions,
        total_garnishments = %total_garnishments,
        net_pay = %net_pay,
        orders = input.garnishment_orders.len(),
        ccpa_compliant = garnishments.ccpa_compliant,
        "Payroll calculation completed"
    );

    let mut audit_trace = AuditTrace {
        steps: vec![
            federal.audit_step,
            social_security.audit_step,
            medicare.audit_step,
            state.audit_step,
            local.audit_step,
        ],
        warnings: Vec::new(),
    };
    audit_trace.steps.extend(garnishments.audit_steps);
    audit_trace.warnings.extend(garnishments.warnings);

    let breakdown = PayrollBreakdown {
        gross_pay,
        pay_frequency: frequency,
        federal_withholding: federal.breakdown,
        fica_taxes: FicaBreakdown {
            social_security_taxable_wages: social_security.taxable_wages,
            social_security_tax: social_security.tax,
            social_security_wage_base: tables.fica().social_security_wage_base,
            medicare_tax: medicare.regular_tax,
            additional_medicare_taxable_wages: medicare.surtax_wages,
            additional_medicare_tax: medicare.additional_tax,
        },
        state_tax: StateTaxBreakdown {
            state: input.jurisdiction.state.to_ascii_uppercase(),
            rate: state.rate_label,
            amount: state.amount,
        },
        local_tax: LocalTaxBreakdown {
            rate: local.rate_label,
            city: local.city_label,
            amount: local.amount,
        },
        disposable_earnings,
        garnishments: GarnishmentBreakdown {
            order: garnishments.deductions.clone(),
            total_amount: total_garnishments,
            ccpa_compliant: garnishments.ccpa_compliant,
            ccpa_limit: format_rate(garnishments.ccpa_limit),
        },
        net_pay,
        audit_trace,
    };

    Ok(PayrollCalculationResult {
        gross_pay,
        federal_income_tax: federal.tax,
        social_security_tax: social_security.tax,
        medicare_tax: medicare.regular_tax,
        additional_medicare_tax: medicare.additional_tax,
        state_tax: state.amount,
        local_tax: local.amount,
        total_mandatory_deductions,
        disposable_earnings,
        garnishments_applied: garnishments.deductions,
        total_garnishments,
        net_pay,
        breakdown,
    })
}

/// A payroll engine bound to one set of rate tables.
///
/// The engine holds only immutable tables, so a single instance can be
/// shared across threads and used for any number of calculations.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::PayrollEngine;
/// use garnishment_engine::models::{
///     FilingStatus, PayrollCalculationInput, TaxElection, WorkJurisdiction,
/// };
/// use rust_decimal::Decimal;
///
/// let engine = PayrollEngine::embedded().unwrap();
/// let input = PayrollCalculationInput {
///     gross_pay: Decimal::new(2000, 0),
///     tax_election: TaxElection::standard(FilingStatus::Single),
///     garnishment_orders: vec![],
///     pay_period_days: 7,
///     jurisdiction: WorkJurisdiction::city("KY", "Louisville"),
///     ytd_gross: Decimal::ZERO,
/// };
///
/// let result = engine.calculate(&input).unwrap();
/// assert_eq!(result.state_tax, Decimal::new(7748, 2));
/// assert_eq!(result.local_tax, Decimal::new(4400, 2));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    tables: TaxTables,
}

impl PayrollEngine {
    /// Creates an engine from rate tables.
    pub fn new(tables: TaxTables) -> Self {
        Self { tables }
    }

    /// Creates an engine from the rate tables compiled into the crate.
    pub fn embedded() -> EngineResult<Self> {
        Ok(Self::new(ConfigLoader::embedded()?.into_tables()))
    }

    /// Returns the rate tables.
    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Calculates one worker's pay for one period.
    pub fn calculate(&self, input: &PayrollCalculationInput) -> EngineResult<PayrollCalculationResult> {
        calculate_payroll(input, &self.tables)
    }
}
