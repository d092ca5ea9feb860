//! Core data models for the Garnishment Engine.
//!
//! This module contains the value objects passed into and returned from a
//! payroll calculation.

mod calculation_result;
mod garnishment;
mod payroll_input;
mod tax_election;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, FederalWithholdingBreakdown, FicaBreakdown,
    GarnishmentBreakdown, GarnishmentDeduction, LocalTaxBreakdown, PayrollBreakdown,
    PayrollCalculationResult, StateTaxBreakdown,
};
pub use garnishment::{
    CapCategory, GarnishmentAmount, GarnishmentOrder, GarnishmentType, OrderStatus,
    applicable_orders,
};
pub use payroll_input::{
    MAX_MONETARY_INPUT, PayFrequency, PayrollCalculationInput, WorkJurisdiction,
};
pub use tax_election::{FilingStatus, TaxElection};
