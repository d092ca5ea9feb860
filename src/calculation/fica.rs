//! FICA (Social Security and Medicare) calculation.
//!
//! Social Security stops once year-to-date wages reach the annual wage base.
//! Medicare has no cap, but an additional surtax applies to the part of this
//! period's wages that carries year-to-date wages past the filing-status
//! threshold.

use rust_decimal::Decimal;

use crate::config::FicaConfig;
use crate::models::{AuditStep, FilingStatus};

use super::currency::round_currency;

/// The result of calculating Social Security tax.
#[derive(Debug, Clone)]
pub struct SocialSecurityResult {
    /// Social Security tax withheld this period.
    pub tax: Decimal,
    /// Wages this period below the wage base.
    pub taxable_wages: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of calculating Medicare tax.
#[derive(Debug, Clone)]
pub struct MedicareResult {
    /// Regular Medicare tax on all wages.
    pub regular_tax: Decimal,
    /// Additional Medicare surtax.
    pub additional_tax: Decimal,
    /// Wages this period subject to the surtax.
    pub surtax_wages: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates Social Security tax, capped at the annual wage base.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::calculate_social_security;
/// use garnishment_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::embedded().unwrap();
/// let fica = config.tables().fica();
///
/// let result = calculate_social_security(Decimal::new(2000, 0), Decimal::ZERO, fica, 2);
/// assert_eq!(result.tax, Decimal::new(12400, 2));
///
/// // Already past the wage base
/// let result = calculate_social_security(Decimal::new(2000, 0), Decimal::new(180000, 0), fica, 2);
/// assert_eq!(result.tax, Decimal::ZERO);
/// ```
pub fn calculate_social_security(
    gross_pay: Decimal,
    ytd_gross: Decimal,
    config: &FicaConfig,
    step_number: u32,
) -> SocialSecurityResult {
    let wage_base = config.social_security_wage_base;
    let remaining_base = (wage_base - ytd_gross).max(Decimal::ZERO);
    let taxable_wages = gross_pay.min(remaining_base);
    let tax = round_currency(taxable_wages * config.social_security_rate);

    let reasoning = if ytd_gross >= wage_base {
        format!(
            "YTD wages ${} already at or above ${} wage base, no Social Security tax",
            ytd_gross.normalize(),
            wage_base.normalize()
        )
    } else if taxable_wages < gross_pay {
        format!(
            "Only ${} of ${} is below the ${} wage base; ${} x {} = ${}",
            taxable_wages.normalize(),
            gross_pay.normalize(),
            wage_base.normalize(),
            taxable_wages.normalize(),
            config.social_security_rate.normalize(),
            tax
        )
    } else {
        format!(
            "${} x {} = ${}",
            gross_pay.normalize(),
            config.social_security_rate.normalize(),
            tax
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security".to_string(),
        rule_name: "Social Security Tax".to_string(),
        authority: config.social_security_authority.clone(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "ytd_gross": ytd_gross.normalize().to_string(),
            "wage_base": wage_base.normalize().to_string(),
            "rate": config.social_security_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "taxable_wages": taxable_wages.normalize().to_string(),
            "tax": tax.to_string()
        }),
        reasoning,
    };

    SocialSecurityResult {
        tax,
        taxable_wages,
        audit_step,
    }
}

/// Calculates regular Medicare tax and the additional Medicare surtax.
///
/// The surtax base is `min(gross, max(0, ytd + gross - threshold))`, so only
/// the wages that cross the threshold in this period are surtaxed on the
/// crossing period, and all wages are surtaxed in later periods.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::calculate_medicare;
/// use garnishment_engine::config::ConfigLoader;
/// use garnishment_engine::models::FilingStatus;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::embedded().unwrap();
/// let fica = config.tables().fica();
///
/// // YTD 199,000 + 2,000 crosses the 200,000 single threshold by 1,000
/// let result = calculate_medicare(
///     Decimal::new(2000, 0),
///     FilingStatus::Single,
///     Decimal::new(199000, 0),
///     fica,
///     3,
/// );
/// assert_eq!(result.regular_tax, Decimal::new(2900, 2));
/// assert_eq!(result.additional_tax, Decimal::new(900, 2));
/// ```
pub fn calculate_medicare(
    gross_pay: Decimal,
    filing_status: FilingStatus,
    ytd_gross: Decimal,
    config: &FicaConfig,
    step_number: u32,
) -> MedicareResult {
    let regular_tax = round_currency(gross_pay * config.medicare_rate);

    let threshold = *config.additional_medicare_thresholds.get(filing_status);
    let surtax_wages = gross_pay.min((ytd_gross + gross_pay - threshold).max(Decimal::ZERO));
    let additional_tax = round_currency(surtax_wages * config.additional_medicare_rate);

    let reasoning = if surtax_wages.is_zero() {
        format!(
            "${} x {} = ${}; YTD wages stay under ${} {} threshold, no surtax",
            gross_pay.normalize(),
            config.medicare_rate.normalize(),
            regular_tax,
            threshold.normalize(),
            filing_status
        )
    } else {
        format!(
            "${} x {} = ${}; ${} above ${} {} threshold x {} = ${} surtax",
            gross_pay.normalize(),
            config.medicare_rate.normalize(),
            regular_tax,
            surtax_wages.normalize(),
            threshold.normalize(),
            filing_status,
            config.additional_medicare_rate.normalize(),
            additional_tax
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "medicare".to_string(),
        rule_name: "Medicare Tax".to_string(),
        authority: config.medicare_authority.clone(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "ytd_gross": ytd_gross.normalize().to_string(),
            "filing_status": filing_status.as_str(),
            "threshold": threshold.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_tax": regular_tax.to_string(),
            "surtax_wages": surtax_wages.normalize().to_string(),
            "additional_tax": additional_tax.to_string()
        }),
        reasoning,
    };

    MedicareResult {
        regular_tax,
        additional_tax,
        surtax_wages,
        audit_step,
    }
}
