//! Garnishment apportionment under CCPA limits.
//!
//! Orders are serviced in ascending priority (input order breaks ties).
//! Percentage orders are always measured against the original disposable
//! earnings, never the balance left by earlier orders. Each order is capped
//! by its type's ceiling and, when the aggregate limit is enforced, by what
//! is left of the combined ceiling.
//!
//! | Order type                  | Per-order ceiling  | Aggregate ceilings     |
//! |-----------------------------|--------------------|------------------------|
//! | child_support               | 65% of disposable  | total ≤ 65%            |
//! | tax_levy, creditor, other   | 25% of disposable  | ordinary ≤ 25%, total  |
//!
//! Ordinary orders receive nothing when disposable earnings are at or below
//! the protected minimum for the pay frequency.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::GarnishmentLimits;
use crate::models::{
    AuditStep, AuditWarning, CapCategory, GarnishmentAmount, GarnishmentDeduction,
    GarnishmentOrder, PayFrequency,
};

use super::currency::{floor_currency, format_rate, round_currency};

/// The outcome of apportioning disposable earnings across garnishment orders.
#[derive(Debug, Clone)]
pub struct GarnishmentApportionment {
    /// Deductions in processing order. Orders that receive nothing are omitted.
    pub deductions: Vec<GarnishmentDeduction>,
    /// Sum of all deductions.
    pub total: Decimal,
    /// Whether the total stays within the applicable CCPA ceiling.
    pub ccpa_compliant: bool,
    /// The ceiling the compliance check measured against.
    pub ccpa_limit: Decimal,
    /// One audit step per order considered, plus the compliance check.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings for skipped orders and compliance failures.
    pub warnings: Vec<AuditWarning>,
}

/// Returns orders sorted by ascending priority, preserving input order among equals.
///
/// # Example
///
/// ```
/// use garnishment_engine::calculation::sort_by_priority;
/// use garnishment_engine::models::{GarnishmentAmount, GarnishmentOrder, GarnishmentType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let fixed = GarnishmentAmount::Fixed(Decimal::new(10, 0));
/// let orders = vec![
///     GarnishmentOrder::new("a", GarnishmentType::Creditor, fixed, 4, start),
///     GarnishmentOrder::new("b", GarnishmentType::ChildSupport, fixed, 1, start),
///     GarnishmentOrder::new("c", GarnishmentType::Other, fixed, 4, start),
/// ];
///
/// let ids: Vec<&str> = sort_by_priority(&orders).iter().map(|o| o.id.as_str()).collect();
/// assert_eq!(ids, vec!["b", "a", "c"]);
/// ```
pub fn sort_by_priority(orders: &[GarnishmentOrder]) -> Vec<&GarnishmentOrder> {
    let mut sorted: Vec<&GarnishmentOrder> = orders.iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|order| order.priority);
    sorted
}

/// Returns the CCPA ceiling that applies to a set of deductions.
///
/// The support ceiling applies when any deduction is for child support,
/// otherwise the general ceiling.
pub fn applicable_ccpa_limit(
    deductions: &[GarnishmentDeduction],
    limits: &GarnishmentLimits,
) -> Decimal {
    let has_support = deductions
        .iter()
        .any(|d| d.garnishment_type.cap_category() == CapCategory::Support);
    limits.max_fraction(if has_support {
        CapCategory::Support
    } else {
        CapCategory::General
    })
}

/// Checks whether total garnishments stay within the applicable CCPA ceiling.
///
/// This is advisory: a breach is reported, never rejected, because
/// conflicting court orders may need human review. Zero disposable earnings
/// is always compliant.
pub fn check_ccpa_compliance(
    disposable_earnings: Decimal,
    deductions: &[GarnishmentDeduction],
    limits: &GarnishmentLimits,
) -> bool {
    if disposable_earnings <= Decimal::ZERO {
        return true;
    }
    let total: Decimal = deductions.iter().map(|d| d.amount).sum();
    total / disposable_earnings <= applicable_ccpa_limit(deductions, limits)
}

/// Apportions disposable earnings across garnishment orders.
///
/// # Arguments
///
/// * `disposable_earnings` - Gross pay less mandatory withholdings
/// * `orders` - Applicable orders, in the caller's order
/// * `limits` - CCPA ceilings and protected minimum
/// * `frequency` - Pay frequency, used to scale the protected minimum
/// * `first_step` - Step number for the first audit step
///
/// # Returns
///
/// A [`GarnishmentApportionment`] with deductions in processing order. The
/// result depends only on the arguments.
pub fn apportion_garnishments(
    disposable_earnings: Decimal,
    orders: &[GarnishmentOrder],
    limits: &GarnishmentLimits,
    frequency: PayFrequency,
    first_step: u32,
) -> GarnishmentApportionment {
    let original = disposable_earnings.max(Decimal::ZERO);
    let protected_minimum = round_currency(limits.protected_minimum(frequency));
    let support_ceiling = floor_currency(original * limits.support_max_fraction);
    let general_ceiling = floor_currency(original * limits.general_max_fraction);
    let general_barred = original <= protected_minimum;

    let mut remaining = original;
    let mut total = Decimal::ZERO;
    let mut general_total = Decimal::ZERO;
    let mut deductions = Vec::new();
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = first_step;

    for order in sort_by_priority(orders) {
        if remaining <= Decimal::ZERO {
            debug!(order_id = %order.id, "Disposable earnings exhausted, stopping apportionment");
            audit_steps.push(AuditStep {
                step_number,
                rule_id: "garnishment_exhausted".to_string(),
                rule_name: "Garnishment Apportionment Stopped".to_string(),
                authority: limits.authority.clone(),
                input: serde_json::json!({
                    "next_order_id": order.id,
                    "remaining_disposable": remaining.to_string()
                }),
                output: serde_json::json!({ "stopped": true }),
                reasoning: format!(
                    "No disposable earnings remain; order '{}' and any later orders receive nothing",
                    order.id
                ),
            });
            step_number += 1;
            break;
        }

        let requested = match order.amount {
            GarnishmentAmount::Fixed(amount) => amount,
            GarnishmentAmount::Percentage(pct) => {
                round_currency(original * pct / Decimal::ONE_HUNDRED)
            }
        };
        let available = requested.min(remaining);

        let category = order.garnishment_type.cap_category();
        let (type_cap, cap_note) = match category {
            CapCategory::Support => (
                support_ceiling,
                format!("{} support ceiling", format_rate(limits.support_max_fraction)),
            ),
            CapCategory::General if general_barred => (
                Decimal::ZERO,
                format!(
                    "disposable ${} at or below ${} protected minimum",
                    original, protected_minimum
                ),
            ),
            CapCategory::General => (
                general_ceiling,
                format!("{} general ceiling", format_rate(limits.general_max_fraction)),
            ),
        };
        let mut amount = available.min(type_cap);

        let mut aggregate_room = None;
        if limits.enforce_aggregate_limit {
            let mut room = (support_ceiling - total).max(Decimal::ZERO);
            if category == CapCategory::General {
                room = room.min((general_ceiling - general_total).max(Decimal::ZERO));
            }
            amount = amount.min(room);
            aggregate_room = Some(room);
        }

        let reasoning = format!(
            "Requested ${}, ${} remaining, capped at ${} ({}){} = ${}",
            requested,
            remaining,
            type_cap,
            cap_note,
            aggregate_room
                .map(|room| format!(", ${} left under aggregate ceiling", room))
                .unwrap_or_default(),
            amount
        );

        audit_steps.push(AuditStep {
            step_number,
            rule_id: format!("garnishment_{}", order.garnishment_type),
            rule_name: "Garnishment Apportionment".to_string(),
            authority: limits.authority.clone(),
            input: serde_json::json!({
                "order_id": order.id,
                "type": order.garnishment_type,
                "priority": order.priority,
                "fixed": match order.amount {
                    GarnishmentAmount::Fixed(a) => Some(a.to_string()),
                    GarnishmentAmount::Percentage(_) => None,
                },
                "percentage": order.amount.percentage().map(|p| p.to_string()),
                "original_disposable": original.to_string(),
                "remaining_disposable": remaining.to_string()
            }),
            output: serde_json::json!({
                "requested": requested.to_string(),
                "type_cap": type_cap.to_string(),
                "amount": amount.to_string()
            }),
            reasoning,
        });
        step_number += 1;

        if amount > Decimal::ZERO {
            debug!(
                order_id = %order.id,
                garnishment_type = %order.garnishment_type,
                priority = order.priority,
                amount = %amount,
                "Garnishment applied"
            );
            remaining -= amount;
            total += amount;
            if category == CapCategory::General {
                general_total += amount;
            }
            deductions.push(GarnishmentDeduction {
                id: order.id.clone(),
                garnishment_type: order.garnishment_type,
                amount,
                percentage: order.amount.percentage(),
                priority: order.priority,
            });
        } else {
            warn!(
                order_id = %order.id,
                garnishment_type = %order.garnishment_type,
                "Garnishment order received nothing under CCPA limits"
            );
            warnings.push(AuditWarning {
                code: "GARNISHMENT_NOT_APPLIED".to_string(),
                message: format!(
                    "Order '{}' ({}) received nothing this period: {}",
                    order.id, order.garnishment_type, cap_note
                ),
                severity: "medium".to_string(),
            });
        }
    }

    let ccpa_limit = applicable_ccpa_limit(&deductions, limits);
    let ccpa_compliant = check_ccpa_compliance(original, &deductions, limits);
    let ratio = if original.is_zero() {
        Decimal::ZERO
    } else {
        total / original
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "ccpa_compliance".to_string(),
        rule_name: "CCPA Compliance Check".to_string(),
        authority: limits.authority.clone(),
        input: serde_json::json!({
            "disposable_earnings": original.to_string(),
            "total_garnished": total.to_string(),
            "limit": format_rate(ccpa_limit)
        }),
        output: serde_json::json!({ "compliant": ccpa_compliant }),
        reasoning: format!(
            "${} garnished of ${} disposable is {} against a {} ceiling",
            total,
            original,
            format_rate(ratio.round_dp(4)),
            format_rate(ccpa_limit)
        ),
    });

    if !ccpa_compliant {
        warn!(
            disposable_earnings = %original,
            total_garnished = %total,
            limit = %format_rate(ccpa_limit),
            "Garnishments exceed CCPA ceiling"
        );
        warnings.push(AuditWarning {
            code: "CCPA_LIMIT_EXCEEDED".to_string(),
            message: format!(
                "Garnishments of ${} exceed {} of ${} disposable earnings; review conflicting orders",
                total,
                format_rate(ccpa_limit),
                original
            ),
            severity: "high".to_string(),
        });
    }

    GarnishmentApportionment {
        deductions,
        total,
        ccpa_compliant,
        ccpa_limit,
        audit_steps,
        warnings,
    }
}
