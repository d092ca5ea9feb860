//! State income tax and local occupational tax resolution.
//!
//! Both taxes are driven entirely by the jurisdiction table: the calculation
//! here never branches on a particular state or city.

use rust_decimal::Decimal;

use crate::config::{Jurisdiction, StateTaxRule};
use crate::models::{AuditStep, PayFrequency};

use super::currency::{format_rate, round_currency};

/// The result of calculating state income tax.
#[derive(Debug, Clone)]
pub struct StateTaxResult {
    /// State tax withheld this period.
    pub amount: Decimal,
    /// The applied rate as a display string (e.g., "4%").
    pub rate_label: String,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The result of calculating local occupational tax.
#[derive(Debug, Clone)]
pub struct LocalTaxResult {
    /// Local tax withheld this period.
    pub amount: Decimal,
    /// The rate applied as a fraction.
    pub rate: Decimal,
    /// The applied rate as a display string (e.g., "2.2%").
    pub rate_label: String,
    /// The matched city, "default" when the fallback rate applied, or "N/A".
    pub city_label: String,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates state income tax for one pay period.
///
/// A `FlatRate` rule taxes `(annualized gross - annual deduction)`, floored
/// at zero, and de-annualizes the result. A `NoTax` rule yields zero.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::calculate_state_tax;
/// use garnishment_engine::config::ConfigLoader;
/// use garnishment_engine::models::PayFrequency;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::embedded().unwrap();
/// let ky = config.tables().jurisdiction("KY").unwrap();
///
/// let result = calculate_state_tax(Decimal::new(2000, 0), "KY", ky, PayFrequency::Weekly, 4);
/// assert_eq!(result.amount, Decimal::new(7748, 2));
/// assert_eq!(result.rate_label, "4%");
/// ```
pub fn calculate_state_tax(
    gross_pay: Decimal,
    state: &str,
    jurisdiction: &Jurisdiction,
    frequency: PayFrequency,
    step_number: u32,
) -> StateTaxResult {
    let (amount, rate_label, output, reasoning) = match &jurisdiction.state_tax {
        StateTaxRule::NoTax => (
            Decimal::ZERO,
            format_rate(Decimal::ZERO),
            serde_json::json!({ "amount": "0" }),
            format!("{} levies no state income tax on wages", jurisdiction.name),
        ),
        StateTaxRule::FlatRate {
            rate,
            annual_deduction,
        } => {
            let annualized_gross = frequency.annualize(gross_pay);
            let taxable_income = (annualized_gross - annual_deduction).max(Decimal::ZERO);
            let annual_tax = taxable_income * rate;
            let amount = round_currency(frequency.deannualize(annual_tax));

            (
                amount,
                format_rate(*rate),
                serde_json::json!({
                    "annualized_gross": annualized_gross.normalize().to_string(),
                    "taxable_income": taxable_income.normalize().to_string(),
                    "annual_tax": annual_tax.normalize().to_string(),
                    "amount": amount.to_string()
                }),
                format!(
                    "(${} annualized - ${} deduction) x {} = ${} / {} = ${}",
                    annualized_gross.normalize(),
                    annual_deduction.normalize(),
                    rate.normalize(),
                    annual_tax.normalize(),
                    frequency.periods_per_year(),
                    amount
                ),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "state_income_tax".to_string(),
        rule_name: "State Income Tax".to_string(),
        authority: jurisdiction.authority.clone(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "state": state,
            "rate": rate_label
        }),
        output,
        reasoning,
    };

    StateTaxResult {
        amount,
        rate_label,
        audit_step,
    }
}

/// Calculates local occupational tax for one pay period.
///
/// Applies only when the jurisdiction has a local tax table. The city is
/// matched case-insensitively; a missing or unknown city falls back to the
/// table's default rate so the tax is never skipped on a name mismatch.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::calculate_local_tax;
/// use garnishment_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::embedded().unwrap();
/// let ky = config.tables().jurisdiction("KY").unwrap();
///
/// let result = calculate_local_tax(Decimal::new(2000, 0), ky, Some("Louisville"), 5);
/// assert_eq!(result.amount, Decimal::new(4400, 2));
///
/// let result = calculate_local_tax(Decimal::new(2000, 0), ky, Some("Frankfort"), 5);
/// assert_eq!(result.city_label, "default");
/// ```
pub fn calculate_local_tax(
    gross_pay: Decimal,
    jurisdiction: &Jurisdiction,
    city: Option<&str>,
    step_number: u32,
) -> LocalTaxResult {
    let Some(table) = &jurisdiction.local_tax else {
        let audit_step = AuditStep {
            step_number,
            rule_id: "local_occupational_tax".to_string(),
            rule_name: "Local Occupational Tax".to_string(),
            authority: jurisdiction.authority.clone(),
            input: serde_json::json!({
                "gross_pay": gross_pay.normalize().to_string(),
                "city": city
            }),
            output: serde_json::json!({ "amount": "0", "applied": false }),
            reasoning: format!("{} has no local occupational tax", jurisdiction.name),
        };
        return LocalTaxResult {
            amount: Decimal::ZERO,
            rate: Decimal::ZERO,
            rate_label: format_rate(Decimal::ZERO),
            city_label: city.map_or_else(|| "N/A".to_string(), str::to_string),
            audit_step,
        };
    };

    let (city_label, rate, match_note) = match city.and_then(|c| table.city_rate(c)) {
        Some((key, rate)) => (key.to_string(), rate, format!("{} rate", key)),
        None => {
            let note = match city {
                Some(c) => format!("'{}' not in rate table, default rate", c),
                None => "no city given, default rate".to_string(),
            };
            ("default".to_string(), table.default_rate, note)
        }
    };
    let amount = round_currency(gross_pay * rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "local_occupational_tax".to_string(),
        rule_name: "Local Occupational Tax".to_string(),
        authority: jurisdiction.authority.clone(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "city": city
        }),
        output: serde_json::json!({
            "matched_city": city_label,
            "rate": rate.normalize().to_string(),
            "amount": amount.to_string(),
            "applied": true
        }),
        reasoning: format!(
            "${} x {} ({}) = ${}",
            gross_pay.normalize(),
            rate.normalize(),
            match_note,
            amount
        ),
    };

    LocalTaxResult {
        amount,
        rate,
        rate_label: format_rate(rate),
        city_label,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, LocalTaxTable, TaxTables};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tables() -> TaxTables {
        ConfigLoader::embedded().unwrap().into_tables()
    }

    #[test]
    fn test_no_tax_state_is_zero() {
        let tables = tables();
        let tn = tables.jurisdiction("TN").unwrap();
        let result = calculate_state_tax(dec("2000"), "TN", tn, PayFrequency::Weekly, 4);

        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.rate_label, "0%");
        assert!(result.audit_step.reasoning.contains("Tennessee"));
    }

    #[test]
    fn test_flat_rate_state_after_deduction() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let result = calculate_state_tax(dec("2000"), "KY", ky, PayFrequency::Weekly, 4);

        // (104000 - 3270) x 0.04 = 4029.20 / 52
        assert_eq!(result.amount, dec("77.48"));
        assert_eq!(result.audit_step.output["annual_tax"], "4029.2");
    }

    #[test]
    fn test_flat_rate_floors_taxable_income_at_zero() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let result = calculate_state_tax(dec("50"), "KY", ky, PayFrequency::Weekly, 4);

        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_flat_rate_uses_same_frequency_as_federal() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let weekly = calculate_state_tax(dec("2000"), "KY", ky, PayFrequency::Weekly, 4);
        let biweekly = calculate_state_tax(dec("4000"), "KY", ky, PayFrequency::Biweekly, 4);

        // same annual figure, half as many periods
        assert_eq!(biweekly.amount, dec("154.97"));
        assert!(biweekly.amount - weekly.amount * Decimal::TWO <= dec("0.01"));
    }

    #[test]
    fn test_local_tax_known_city() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let result = calculate_local_tax(dec("2000"), ky, Some("Louisville"), 5);

        assert_eq!(result.amount, dec("44.00"));
        assert_eq!(result.rate_label, "2.2%");
        assert_eq!(result.city_label, "louisville");
    }

    #[test]
    fn test_local_tax_city_match_ignores_case_and_spacing() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();

        let result = calculate_local_tax(dec("1000"), ky, Some("LEXINGTON"), 5);
        assert_eq!(result.amount, dec("17.50"));

        let result = calculate_local_tax(dec("1000"), ky, Some("Bowling Green"), 5);
        assert_eq!(result.city_label, "bowling_green");
        assert_eq!(result.amount, dec("15.00"));
    }

    #[test]
    fn test_local_tax_unknown_city_uses_default_rate() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let result = calculate_local_tax(dec("2000"), ky, Some("Frankfort"), 5);

        assert_eq!(result.amount, dec("30.00"));
        assert_eq!(result.city_label, "default");
        assert!(result.audit_step.reasoning.contains("'Frankfort' not in rate table"));
    }

    #[test]
    fn test_local_tax_missing_city_uses_default_rate() {
        let tables = tables();
        let ky = tables.jurisdiction("KY").unwrap();
        let result = calculate_local_tax(dec("2000"), ky, None, 5);

        assert_eq!(result.amount, dec("30.00"));
        assert_eq!(result.rate, dec("0.015"));
    }

    #[test]
    fn test_local_tax_not_applied_without_table() {
        let tables = tables();
        let tn = tables.jurisdiction("TN").unwrap();
        let result = calculate_local_tax(dec("2000"), tn, Some("Nashville"), 5);

        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.rate_label, "0%");
        assert_eq!(result.city_label, "Nashville");
        assert_eq!(result.audit_step.output["applied"], false);
    }

    #[test]
    fn test_new_jurisdiction_is_data_only() {
        let mut cities = BTreeMap::new();
        cities.insert("springfield".to_string(), dec("0.01"));
        let jurisdiction = Jurisdiction {
            name: "Example State".to_string(),
            authority: String::new(),
            state_tax: StateTaxRule::FlatRate {
                rate: dec("0.05"),
                annual_deduction: Decimal::ZERO,
            },
            local_tax: Some(LocalTaxTable {
                default_rate: dec("0.005"),
                cities,
            }),
        };

        let state = calculate_state_tax(dec("1000"), "EX", &jurisdiction, PayFrequency::Weekly, 4);
        let local = calculate_local_tax(dec("1000"), &jurisdiction, Some("Springfield"), 5);
        assert_eq!(state.amount, dec("50.00"));
        assert_eq!(local.amount, dec("10.00"));
    }
}
