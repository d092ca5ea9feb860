//! Configuration types for the payroll rate tables.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML rate-table files.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{CapCategory, FilingStatus, PayFrequency};

/// Metadata about the rate tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TablesMetadata {
    /// The tax year the tables apply to.
    pub tax_year: i32,
    /// The human-readable name of the table set.
    pub name: String,
    /// The version of the table set.
    pub version: String,
}

/// A value that differs by filing status.
///
/// Every filing status must be present, so lookups cannot miss.
#[derive(Debug, Clone, Deserialize)]
pub struct ByFilingStatus<T> {
    /// Value for single filers.
    pub single: T,
    /// Value for married filers.
    pub married: T,
    /// Value for heads of household.
    pub head_of_household: T,
}

impl<T> ByFilingStatus<T> {
    /// Returns the value for the given filing status.
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::Married => &self.married,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    /// Iterates over every filing status and its value.
    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        [
            (FilingStatus::Single, &self.single),
            (FilingStatus::Married, &self.married),
            (FilingStatus::HeadOfHousehold, &self.head_of_household),
        ]
        .into_iter()
    }
}

/// One band of a progressive bracket table.
///
/// Income in `[min, max)` is taxed at `rate`. The top bracket has no `max`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Lower bound of the bracket (inclusive).
    pub min: Decimal,
    /// Upper bound of the bracket (exclusive), or `None` for the top bracket.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Marginal rate as a fraction (0.22 for 22%).
    pub rate: Decimal,
}

/// Federal income tax configuration from federal.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct FederalTaxConfig {
    /// Statutory reference for the bracket tables.
    pub authority: String,
    /// Standard deduction by filing status.
    pub standard_deductions: ByFilingStatus<Decimal>,
    /// Progressive bracket table by filing status.
    pub brackets: ByFilingStatus<Vec<TaxBracket>>,
}

/// FICA configuration from fica.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct FicaConfig {
    /// Statutory reference for Social Security.
    pub social_security_authority: String,
    /// Statutory reference for Medicare.
    pub medicare_authority: String,
    /// Social Security employee rate.
    pub social_security_rate: Decimal,
    /// Annual Social Security wage base.
    pub social_security_wage_base: Decimal,
    /// Regular Medicare employee rate.
    pub medicare_rate: Decimal,
    /// Additional Medicare surtax rate.
    pub additional_medicare_rate: Decimal,
    /// YTD wage threshold above which the surtax applies.
    pub additional_medicare_thresholds: ByFilingStatus<Decimal>,
}

/// How a state taxes wages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateTaxRule {
    /// The state levies no income tax on wages.
    NoTax,
    /// A flat rate on annualized wages less an annual deduction.
    FlatRate {
        /// Flat rate as a fraction.
        rate: Decimal,
        /// Annual deduction subtracted before applying the rate.
        annual_deduction: Decimal,
    },
}

/// City-level occupational tax rates within a state.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalTaxTable {
    /// Rate applied when the city is missing or not in `cities`.
    pub default_rate: Decimal,
    /// Rates keyed by normalized city name.
    pub cities: BTreeMap<String, Decimal>,
}

impl LocalTaxTable {
    /// Looks up a city's rate.
    ///
    /// Matching ignores case and treats spaces, hyphens and underscores alike.
    /// Returns the matched key and its rate, or `None` if the city is unknown.
    pub fn city_rate(&self, city: &str) -> Option<(&str, Decimal)> {
        let key = normalize_city(city);
        self.cities
            .get_key_value(&key)
            .map(|(name, rate)| (name.as_str(), *rate))
    }
}

/// Normalizes a city name for rate-table lookup ("Bowling Green" → "bowling_green").
pub fn normalize_city(city: &str) -> String {
    city.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// The tax rules for one state.
#[derive(Debug, Clone, Deserialize)]
pub struct Jurisdiction {
    /// Human-readable state name.
    pub name: String,
    /// Statutory reference for the state tax.
    #[serde(default)]
    pub authority: String,
    /// How the state taxes wages.
    pub state_tax: StateTaxRule,
    /// City-level occupational tax, if the state has one.
    #[serde(default)]
    pub local_tax: Option<LocalTaxTable>,
}

/// Jurisdiction table from jurisdictions.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionConfig {
    /// Jurisdictions keyed by upper-case state code.
    pub states: BTreeMap<String, Jurisdiction>,
}

/// CCPA garnishment limits from garnishment.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct GarnishmentLimits {
    /// Statutory reference for the limits.
    pub authority: String,
    /// Maximum fraction of disposable earnings for support orders.
    pub support_max_fraction: Decimal,
    /// Maximum fraction of disposable earnings for ordinary garnishments.
    pub general_max_fraction: Decimal,
    /// Weekly disposable earnings below which ordinary garnishment is barred.
    pub protected_weekly_minimum: Decimal,
    /// Whether orders are also capped so the running total stays within the ceilings.
    ///
    /// When enabled, results always report `ccpa_compliant: true`; the compliance
    /// check can only flag a breach with this switched off.
    #[serde(default = "default_enforce_aggregate")]
    pub enforce_aggregate_limit: bool,
}

fn default_enforce_aggregate() -> bool {
    true
}

impl GarnishmentLimits {
    /// Returns the ceiling fraction for a cap category.
    pub fn max_fraction(&self, category: CapCategory) -> Decimal {
        match category {
            CapCategory::Support => self.support_max_fraction,
            CapCategory::General => self.general_max_fraction,
        }
    }

    /// Returns the protected minimum scaled to the pay frequency.
    ///
    /// The weekly figure is multiplied by 52 and divided by periods per year,
    /// giving $435.00 biweekly, $471.25 semi-monthly and $942.50 monthly for
    /// the 2025 figure of $217.50.
    pub fn protected_minimum(&self, frequency: PayFrequency) -> Decimal {
        PayFrequency::Weekly.annualize(self.protected_weekly_minimum) / frequency.periods_per_year()
    }
}

/// The complete set of rate tables loaded from YAML files.
#[derive(Debug, Clone)]
pub struct TaxTables {
    metadata: TablesMetadata,
    federal: FederalTaxConfig,
    fica: FicaConfig,
    jurisdictions: BTreeMap<String, Jurisdiction>,
    garnishment: GarnishmentLimits,
}

impl TaxTables {
    /// Creates rate tables from their component parts, validating them.
    ///
    /// State codes are normalized to upper case.
    pub fn new(
        metadata: TablesMetadata,
        federal: FederalTaxConfig,
        fica: FicaConfig,
        jurisdictions: JurisdictionConfig,
        garnishment: GarnishmentLimits,
    ) -> EngineResult<Self> {
        let jurisdictions = jurisdictions
            .states
            .into_iter()
            .map(|(code, jurisdiction)| (code.trim().to_ascii_uppercase(), jurisdiction))
            .collect();

        let tables = Self {
            metadata,
            federal,
            fica,
            jurisdictions,
            garnishment,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Returns the table metadata.
    pub fn metadata(&self) -> &TablesMetadata {
        &self.metadata
    }

    /// Returns the federal income tax configuration.
    pub fn federal(&self) -> &FederalTaxConfig {
        &self.federal
    }

    /// Returns the FICA configuration.
    pub fn fica(&self) -> &FicaConfig {
        &self.fica
    }

    /// Returns the garnishment limits.
    pub fn garnishment(&self) -> &GarnishmentLimits {
        &self.garnishment
    }

    /// Returns all jurisdictions keyed by state code.
    pub fn jurisdictions(&self) -> &BTreeMap<String, Jurisdiction> {
        &self.jurisdictions
    }

    /// Looks up a jurisdiction by state code (case-insensitive).
    pub fn jurisdiction(&self, state: &str) -> EngineResult<&Jurisdiction> {
        self.jurisdictions
            .get(&state.trim().to_ascii_uppercase())
            .ok_or_else(|| EngineError::JurisdictionNotFound {
                state: state.to_string(),
            })
    }

    /// Replaces the garnishment limits.
    pub fn with_garnishment_limits(mut self, limits: GarnishmentLimits) -> EngineResult<Self> {
        self.garnishment = limits;
        self.validate()?;
        Ok(self)
    }

    /// Checks that brackets cover `[0, ∞)` without gaps and that every rate is a fraction.
    fn validate(&self) -> EngineResult<()> {
        for (status, brackets) in self.federal.brackets.iter() {
            validate_brackets(status, brackets)?;
        }
        for (status, deduction) in self.federal.standard_deductions.iter() {
            if *deduction < Decimal::ZERO {
                return Err(invalid(format!(
                    "standard deduction for {} is negative",
                    status
                )));
            }
        }

        check_fraction("social_security_rate", self.fica.social_security_rate)?;
        check_fraction("medicare_rate", self.fica.medicare_rate)?;
        check_fraction("additional_medicare_rate", self.fica.additional_medicare_rate)?;
        if self.fica.social_security_wage_base <= Decimal::ZERO {
            return Err(invalid("social_security_wage_base must be positive".to_string()));
        }

        for (code, jurisdiction) in &self.jurisdictions {
            if let StateTaxRule::FlatRate {
                rate,
                annual_deduction,
            } = &jurisdiction.state_tax
            {
                check_fraction(&format!("{} state rate", code), *rate)?;
                if *annual_deduction < Decimal::ZERO {
                    return Err(invalid(format!("{} annual deduction is negative", code)));
                }
            }
            if let Some(local) = &jurisdiction.local_tax {
                check_fraction(&format!("{} default local rate", code), local.default_rate)?;
                for (city, rate) in &local.cities {
                    check_fraction(&format!("{} local rate for {}", code, city), *rate)?;
                }
            }
        }

        check_fraction("support_max_fraction", self.garnishment.support_max_fraction)?;
        check_fraction("general_max_fraction", self.garnishment.general_max_fraction)?;
        if self.garnishment.protected_weekly_minimum < Decimal::ZERO {
            return Err(invalid("protected_weekly_minimum is negative".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig { message }
}

fn check_fraction(name: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(format!("{} must be between 0 and 1, got {}", name, value)));
    }
    Ok(())
}

fn validate_brackets(status: FilingStatus, brackets: &[TaxBracket]) -> EngineResult<()> {
    let Some(first) = brackets.first() else {
        return Err(invalid(format!("{} bracket table is empty", status)));
    };
    if first.min != Decimal::ZERO {
        return Err(invalid(format!("{} brackets must start at 0", status)));
    }

    let last_index = brackets.len() - 1;
    for (index, bracket) in brackets.iter().enumerate() {
        check_fraction(&format!("{} bracket rate", status), bracket.rate)?;

        match bracket.max {
            Some(max) if index == last_index => {
                return Err(invalid(format!(
                    "{} top bracket must be open-ended, found max {}",
                    status, max
                )));
            }
            Some(max) => {
                if max <= bracket.min {
                    return Err(invalid(format!(
                        "{} bracket starting at {} has max {} not above min",
                        status, bracket.min, max
                    )));
                }
                if brackets[index + 1].min != max {
                    return Err(invalid(format!(
                        "{} brackets have a gap or overlap at {}",
                        status, max
                    )));
                }
            }
            None if index != last_index => {
                return Err(invalid(format!(
                    "{} bracket starting at {} is open-ended but not last",
                    status, bracket.min
                )));
            }
            None => {}
        }
    }

    Ok(())
}
