//! End-to-end tests for the payroll engine.
//!
//! This test suite covers full gross-to-net calculations including:
//! - Tennessee (no state or local tax) with support and creditor orders
//! - Kentucky with Louisville occupational tax and a tax levy
//! - Aggregate CCPA ceiling enforced and disabled
//! - Biweekly pay and the Social Security wage base
//! - JSON input and output
//! - Error cases

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;

use garnishment_engine::calculation::PayrollEngine;
use garnishment_engine::config::ConfigLoader;
use garnishment_engine::error::EngineError;
use garnishment_engine::models::{
    FilingStatus, GarnishmentAmount, GarnishmentOrder, GarnishmentType, PayrollCalculationInput,
    PayrollCalculationResult, TaxElection, WorkJurisdiction,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn create_engine() -> PayrollEngine {
    let config = ConfigLoader::load("./config/us_2025").expect("Failed to load config");
    PayrollEngine::new(config.into_tables())
}

fn create_individual_cap_engine() -> PayrollEngine {
    let tables = ConfigLoader::load("./config/us_2025")
        .expect("Failed to load config")
        .into_tables();
    let mut limits = tables.garnishment().clone();
    limits.enforce_aggregate_limit = false;
    PayrollEngine::new(tables.with_garnishment_limits(limits).unwrap())
}

fn create_order(
    id: &str,
    garnishment_type: GarnishmentType,
    amount: GarnishmentAmount,
    priority: i32,
) -> GarnishmentOrder {
    GarnishmentOrder::new(
        id,
        garnishment_type,
        amount,
        priority,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    )
}

fn create_input(
    gross: &str,
    jurisdiction: WorkJurisdiction,
    orders: Vec<GarnishmentOrder>,
) -> PayrollCalculationInput {
    PayrollCalculationInput {
        gross_pay: decimal(gross),
        tax_election: TaxElection::standard(FilingStatus::Single),
        garnishment_orders: orders,
        pay_period_days: 7,
        jurisdiction,
        ytd_gross: Decimal::ZERO,
    }
}

/// $2000/week single in Tennessee: child support 50% (p1), creditor 25% (p4).
fn scenario_a() -> PayrollCalculationInput {
    create_input(
        "2000",
        WorkJurisdiction::state("TN"),
        vec![
            create_order(
                "cs-1",
                GarnishmentType::ChildSupport,
                GarnishmentAmount::Percentage(decimal("50")),
                1,
            ),
            create_order(
                "cred-1",
                GarnishmentType::Creditor,
                GarnishmentAmount::Percentage(decimal("25")),
                4,
            ),
        ],
    )
}

/// $2000/week single in Louisville, KY: child support 50% (p1), $400 levy (p2),
/// creditor 25% (p4).
fn scenario_b() -> PayrollCalculationInput {
    create_input(
        "2000",
        WorkJurisdiction::city("KY", "Louisville"),
        vec![
            create_order(
                "cs-1",
                GarnishmentType::ChildSupport,
                GarnishmentAmount::Percentage(decimal("50")),
                1,
            ),
            create_order(
                "levy-1",
                GarnishmentType::TaxLevy,
                GarnishmentAmount::Fixed(decimal("400")),
                2,
            ),
            create_order(
                "cred-1",
                GarnishmentType::Creditor,
                GarnishmentAmount::Percentage(decimal("25")),
                4,
            ),
        ],
    )
}

fn amount_for(result: &PayrollCalculationResult, id: &str) -> Option<Decimal> {
    result
        .garnishments_applied
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.amount)
}

fn assert_identities_hold(result: &PayrollCalculationResult) {
    assert_eq!(
        result.total_mandatory_deductions,
        result.federal_income_tax
            + result.social_security_tax
            + result.medicare_tax
            + result.additional_medicare_tax
            + result.state_tax
            + result.local_tax
    );
    let garnished: Decimal = result.garnishments_applied.iter().map(|g| g.amount).sum();
    assert_eq!(result.total_garnishments, garnished);
    assert_eq!(
        result.net_pay,
        (result.gross_pay - result.total_mandatory_deductions - result.total_garnishments)
            .max(Decimal::ZERO)
    );
}

fn warning_codes(result: &PayrollCalculationResult) -> Vec<&str> {
    result
        .breakdown
        .audit_trace
        .warnings
        .iter()
        .map(|w| w.code.as_str())
        .collect()
}

// =============================================================================
// Tennessee
// =============================================================================

#[test]
fn test_tennessee_withholdings() {
    let result = create_engine().calculate(&scenario_a()).unwrap();

    assert_eq!(result.federal_income_tax, decimal("281.40"));
    assert_eq!(result.social_security_tax, decimal("124.00"));
    assert_eq!(result.medicare_tax, decimal("29.00"));
    assert_eq!(result.additional_medicare_tax, Decimal::ZERO);
    assert_eq!(result.state_tax, Decimal::ZERO);
    assert_eq!(result.local_tax, Decimal::ZERO);
    assert_eq!(result.total_mandatory_deductions, decimal("434.40"));
    assert_eq!(result.disposable_earnings, decimal("1565.60"));
    assert_eq!(result.breakdown.state_tax.rate, "0%");
    assert_eq!(result.breakdown.local_tax.city, "N/A");
}

#[test]
fn test_tennessee_aggregate_ceiling_limits_creditor() {
    let result = create_engine().calculate(&scenario_a()).unwrap();

    assert_eq!(amount_for(&result, "cs-1"), Some(decimal("782.80")));
    assert_eq!(amount_for(&result, "cred-1"), Some(decimal("234.84")));
    assert_eq!(result.total_garnishments, decimal("1017.64"));
    assert_eq!(result.net_pay, decimal("547.96"));
    assert!(result.breakdown.garnishments.ccpa_compliant);
    assert_eq!(result.breakdown.garnishments.ccpa_limit, "65%");
    assert_identities_hold(&result);
}

#[test]
fn test_tennessee_individual_caps_only() {
    let result = create_individual_cap_engine().calculate(&scenario_a()).unwrap();

    assert_eq!(amount_for(&result, "cs-1"), Some(decimal("782.80")));
    assert_eq!(amount_for(&result, "cred-1"), Some(decimal("391.40")));
    assert_eq!(result.total_garnishments, decimal("1174.20"));
    assert_eq!(result.net_pay, decimal("391.40"));
    assert!(!result.breakdown.garnishments.ccpa_compliant);
    assert!(warning_codes(&result).contains(&"CCPA_LIMIT_EXCEEDED"));
    assert_identities_hold(&result);
}

// =============================================================================
// Kentucky / Louisville
// =============================================================================

#[test]
fn test_louisville_withholdings() {
    let result = create_engine().calculate(&scenario_b()).unwrap();

    assert_eq!(result.federal_income_tax, decimal("281.40"));
    assert_eq!(result.state_tax, decimal("77.48"));
    assert_eq!(result.local_tax, decimal("44.00"));
    assert_eq!(result.total_mandatory_deductions, decimal("555.88"));
    assert_eq!(result.disposable_earnings, decimal("1444.12"));
    assert_eq!(result.breakdown.state_tax.state, "KY");
    assert_eq!(result.breakdown.state_tax.rate, "4%");
    assert_eq!(result.breakdown.local_tax.rate, "2.2%");
}

#[test]
fn test_louisville_aggregate_ceiling_skips_creditor() {
    let result = create_engine().calculate(&scenario_b()).unwrap();

    assert_eq!(amount_for(&result, "cs-1"), Some(decimal("722.06")));
    assert_eq!(amount_for(&result, "levy-1"), Some(decimal("216.61")));
    assert_eq!(amount_for(&result, "cred-1"), None);
    assert_eq!(result.total_garnishments, decimal("938.67"));
    assert_eq!(result.net_pay, decimal("505.45"));
    assert!(result.breakdown.garnishments.ccpa_compliant);
    assert_eq!(warning_codes(&result), vec!["GARNISHMENT_NOT_APPLIED"]);
    assert_identities_hold(&result);
}

#[test]
fn test_louisville_individual_caps_exhaust_disposable() {
    let result = create_individual_cap_engine().calculate(&scenario_b()).unwrap();

    assert_eq!(amount_for(&result, "cs-1"), Some(decimal("722.06")));
    assert_eq!(amount_for(&result, "levy-1"), Some(decimal("361.03")));
    assert_eq!(amount_for(&result, "cred-1"), Some(decimal("361.03")));
    assert_eq!(result.total_garnishments, decimal("1444.12"));
    assert_eq!(result.net_pay, Decimal::ZERO);
    assert!(!result.breakdown.garnishments.ccpa_compliant);
    assert_identities_hold(&result);
}

#[test]
fn test_unknown_kentucky_city_uses_default_rate() {
    let input = create_input("2000", WorkJurisdiction::city("KY", "Frankfort"), vec![]);
    let result = create_engine().calculate(&input).unwrap();

    assert_eq!(result.local_tax, decimal("30.00"));
    assert_eq!(result.breakdown.local_tax.city, "default");
}

#[test]
fn test_city_names_match_loosely() {
    let engine = create_engine();
    let spaced = engine
        .calculate(&create_input("2000", WorkJurisdiction::city("ky", "Bowling Green"), vec![]))
        .unwrap();
    let underscored = engine
        .calculate(&create_input("2000", WorkJurisdiction::city("KY", "bowling_green"), vec![]))
        .unwrap();

    assert_eq!(spaced.local_tax, decimal("30.00"));
    assert_eq!(spaced.local_tax, underscored.local_tax);
}

// =============================================================================
// Pay frequency and FICA
// =============================================================================

#[test]
fn test_biweekly_pay() {
    let mut input = create_input("4000", WorkJurisdiction::state("TN"), vec![]);
    input.pay_period_days = 14;
    let result = create_engine().calculate(&input).unwrap();

    assert_eq!(result.federal_income_tax, decimal("562.81"));
    assert_eq!(result.social_security_tax, decimal("248.00"));
    assert_eq!(result.medicare_tax, decimal("58.00"));
    assert_eq!(result.net_pay, decimal("3131.19"));
}

#[test]
fn test_social_security_stops_at_wage_base() {
    let mut input = create_input("2000", WorkJurisdiction::state("TN"), vec![]);
    input.ytd_gross = decimal("176100");
    let result = create_engine().calculate(&input).unwrap();

    assert_eq!(result.social_security_tax, Decimal::ZERO);
    assert_eq!(result.medicare_tax, decimal("29.00"));
    assert_identities_hold(&result);
}

#[test]
fn test_additional_medicare_above_threshold() {
    let mut input = create_input("2000", WorkJurisdiction::state("TN"), vec![]);
    input.ytd_gross = decimal("250000");
    let result = create_engine().calculate(&input).unwrap();

    assert_eq!(result.additional_medicare_tax, decimal("18.00"));
    assert_eq!(result.total_mandatory_deductions, decimal("328.40"));
    assert_identities_hold(&result);
}

// =============================================================================
// Garnishment edge cases
// =============================================================================

#[test]
fn test_creditor_barred_below_protected_minimum() {
    let input = create_input(
        "250",
        WorkJurisdiction::state("TN"),
        vec![create_order(
            "cred-1",
            GarnishmentType::Creditor,
            GarnishmentAmount::Fixed(decimal("50")),
            1,
        )],
    );
    let result = create_engine().calculate(&input).unwrap();

    // 250 - 15.50 SS - 3.63 Medicare = 230.87; federal is zero below the deduction
    assert_eq!(result.disposable_earnings, decimal("230.87"));
    assert!(result.disposable_earnings > decimal("217.50"));
    assert_eq!(amount_for(&result, "cred-1"), Some(decimal("50")));

    let input = create_input(
        "230",
        WorkJurisdiction::state("TN"),
        vec![create_order(
            "cred-1",
            GarnishmentType::Creditor,
            GarnishmentAmount::Fixed(decimal("50")),
            1,
        )],
    );
    let result = create_engine().calculate(&input).unwrap();

    assert!(result.disposable_earnings <= decimal("217.50"));
    assert!(result.garnishments_applied.is_empty());
    assert_eq!(warning_codes(&result), vec!["GARNISHMENT_NOT_APPLIED"]);
}

#[test]
fn test_equal_priorities_keep_input_order() {
    let input = create_input(
        "2000",
        WorkJurisdiction::state("TN"),
        vec![
            create_order("second", GarnishmentType::Other, GarnishmentAmount::Fixed(decimal("100")), 3),
            create_order("first", GarnishmentType::ChildSupport, GarnishmentAmount::Fixed(decimal("100")), 1),
            create_order("third", GarnishmentType::Creditor, GarnishmentAmount::Fixed(decimal("100")), 3),
        ],
    );
    let result = create_engine().calculate(&input).unwrap();

    let ids: Vec<&str> = result.garnishments_applied.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_calculation_from_json_input() {
    let body = json!({
        "gross_pay": "2000",
        "tax_election": { "filing_status": "single" },
        "garnishment_orders": [
            {
                "id": "cs-1",
                "type": "child_support",
                "amount_percentage": "50",
                "priority": 1,
                "effective_date": "2025-01-01"
            },
            {
                "id": "levy-1",
                "type": "tax_levy",
                "amount_fixed": "400",
                "priority": 2,
                "effective_date": "2025-01-01",
                "creditor_name": "IRS"
            },
            {
                "id": "cred-1",
                "type": "creditor",
                "amount_percentage": "25",
                "priority": 4,
                "effective_date": "2025-01-01"
            }
        ],
        "jurisdiction": { "state": "KY", "city": "Louisville" }
    });
    let input: PayrollCalculationInput = serde_json::from_value(body).unwrap();
    assert_eq!(input.pay_period_days, 7);

    let result = create_engine().calculate(&input).unwrap();
    let output: Value = serde_json::to_value(&result).unwrap();

    assert_eq!(output["net_pay"], "505.45");
    assert_eq!(output["garnishments_applied"][0]["type"], "child_support");
    assert_eq!(output["garnishments_applied"][1]["amount"], "216.61");
    assert_eq!(output["breakdown"]["local_tax"]["rate"], "2.2%");
    assert_eq!(output["breakdown"]["audit_trace"]["steps"][0]["rule_id"], "federal_income_tax");
}

#[test]
fn test_order_with_both_amount_forms_is_rejected() {
    let body = json!({
        "id": "bad-1",
        "type": "creditor",
        "amount_fixed": "100",
        "amount_percentage": "10",
        "priority": 1,
        "effective_date": "2025-01-01"
    });
    let error = serde_json::from_value::<GarnishmentOrder>(body).unwrap_err();
    assert!(error.to_string().contains("bad-1"));
}

#[test]
fn test_unknown_filing_status_in_json_is_rejected() {
    let body = json!({
        "gross_pay": "2000",
        "tax_election": { "filing_status": "widowed" },
        "jurisdiction": { "state": "TN" }
    });
    assert!(serde_json::from_value::<PayrollCalculationInput>(body).is_err());
    assert!(matches!(
        FilingStatus::from_str("widowed"),
        Err(EngineError::UnknownFilingStatus { .. })
    ));
}

#[test]
fn test_identical_input_gives_identical_output() {
    let engine = create_engine();
    let first = serde_json::to_string(&engine.calculate(&scenario_b()).unwrap()).unwrap();
    let second = serde_json::to_string(&engine.calculate(&scenario_b()).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = std::sync::Arc::new(create_engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || engine.calculate(&scenario_a()).unwrap().net_pay)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), decimal("547.96"));
    }
}

// =============================================================================
// Error cases
// =============================================================================

#[test]
fn test_unknown_state_is_error() {
    let input = create_input("2000", WorkJurisdiction::state("ZZ"), vec![]);
    match create_engine().calculate(&input) {
        Err(EngineError::JurisdictionNotFound { state }) => assert_eq!(state, "ZZ"),
        other => panic!("Expected JurisdictionNotFound, got {:?}", other),
    }
}

#[test]
fn test_negative_gross_is_error() {
    let input = create_input("-1", WorkJurisdiction::state("TN"), vec![]);
    assert!(matches!(
        create_engine().calculate(&input),
        Err(EngineError::InvalidInput { .. })
    ));
}

#[test]
fn test_oversized_amounts_are_errors() {
    let engine = create_engine();

    let input = create_input("2000000000000000000000000000", WorkJurisdiction::state("TN"), vec![]);
    match engine.calculate(&input) {
        Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "gross_pay"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }

    let mut input = create_input("2000", WorkJurisdiction::state("TN"), vec![]);
    input.ytd_gross = Decimal::MAX;
    match engine.calculate(&input) {
        Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "ytd_gross"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_largest_accepted_amounts_calculate() {
    let mut input = create_input("1000000000000000", WorkJurisdiction::city("KY", "Louisville"), vec![]);
    input.ytd_gross = decimal("1000000000000000");
    let result = create_engine().calculate(&input).unwrap();

    assert_eq!(result.social_security_tax, Decimal::ZERO);
    assert_identities_hold(&result);
}

#[test]
fn test_hand_built_order_with_bad_percentage_is_error() {
    let input = create_input(
        "2000",
        WorkJurisdiction::state("TN"),
        vec![create_order(
            "bad-1",
            GarnishmentType::Creditor,
            GarnishmentAmount::Percentage(decimal("150")),
            1,
        )],
    );
    match create_engine().calculate(&input) {
        Err(EngineError::InvalidGarnishmentOrder { order_id, .. }) => assert_eq!(order_id, "bad-1"),
        other => panic!("Expected InvalidGarnishmentOrder, got {:?}", other),
    }
}

#[test]
fn test_unsupported_pay_period_is_error() {
    let mut input = create_input("2000", WorkJurisdiction::state("TN"), vec![]);
    input.pay_period_days = 21;
    assert!(matches!(
        create_engine().calculate(&input),
        Err(EngineError::UnsupportedPayPeriod { days: 21 })
    ));
}
