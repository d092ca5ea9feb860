//! Calculation logic for the payroll engine.
//!
//! This module contains the withholding calculators (federal income tax,
//! Social Security, Medicare, state and local tax), the garnishment
//! apportionment under CCPA limits, and the orchestrator that composes them
//! into a single gross-to-net calculation.

mod currency;
mod federal_withholding;
mod fica;
mod garnishment;
mod payroll;
mod state_local;

pub use federal_withholding::{
    FederalWithholdingResult, calculate_federal_withholding, progressive_tax,
};
pub use fica::{MedicareResult, SocialSecurityResult, calculate_medicare, calculate_social_security};
pub use garnishment::{
    GarnishmentApportionment, applicable_ccpa_limit, apportion_garnishments,
    check_ccpa_compliance, sort_by_priority,
};
pub use payroll::{PayrollEngine, calculate_payroll};
pub use state_local::{LocalTaxResult, StateTaxResult, calculate_local_tax, calculate_state_tax};
