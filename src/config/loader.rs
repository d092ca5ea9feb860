//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll rate
//! tables from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{
    FederalTaxConfig, FicaConfig, GarnishmentLimits, JurisdictionConfig, TablesMetadata,
    TaxTables,
};

const EMBEDDED_TABLES: &str = include_str!("../../config/us_2025/tables.yaml");
const EMBEDDED_FEDERAL: &str = include_str!("../../config/us_2025/federal.yaml");
const EMBEDDED_FICA: &str = include_str!("../../config/us_2025/fica.yaml");
const EMBEDDED_JURISDICTIONS: &str = include_str!("../../config/us_2025/jurisdictions.yaml");
const EMBEDDED_GARNISHMENT: &str = include_str!("../../config/us_2025/garnishment.yaml");

/// Loads and provides access to payroll rate tables.
///
/// # Directory Structure
///
/// ```text
/// config/us_2025/
/// ├── tables.yaml         # Table set metadata
/// ├── federal.yaml        # Brackets and standard deductions
/// ├── fica.yaml           # Social Security and Medicare rates
/// ├── jurisdictions.yaml  # State and city rate table
/// └── garnishment.yaml    # CCPA limits
/// ```
///
/// # Example
///
/// ```no_run
/// use garnishment_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/us_2025").unwrap();
/// println!("Loaded tables: {}", loader.tables().metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    tables: TaxTables,
}

impl ConfigLoader {
    /// Loads rate tables from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The tables are inconsistent (gaps in brackets, rates outside 0..=1)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<TablesMetadata>(&path.join("tables.yaml"))?;
        let federal = Self::load_yaml::<FederalTaxConfig>(&path.join("federal.yaml"))?;
        let fica = Self::load_yaml::<FicaConfig>(&path.join("fica.yaml"))?;
        let jurisdictions =
            Self::load_yaml::<JurisdictionConfig>(&path.join("jurisdictions.yaml"))?;
        let garnishment = Self::load_yaml::<GarnishmentLimits>(&path.join("garnishment.yaml"))?;

        let tables = TaxTables::new(metadata, federal, fica, jurisdictions, garnishment)?;
        debug!(
            path = %path.display(),
            tax_year = tables.metadata().tax_year,
            jurisdictions = tables.jurisdictions().len(),
            "Loaded rate tables"
        );

        Ok(Self { tables })
    }

    /// Loads the 2025 rate tables compiled into the crate.
    ///
    /// # Example
    ///
    /// ```
    /// use garnishment_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::embedded().unwrap();
    /// assert_eq!(loader.tables().metadata().tax_year, 2025);
    /// ```
    pub fn embedded() -> EngineResult<Self> {
        let metadata = Self::parse_yaml::<TablesMetadata>("<embedded>/tables.yaml", EMBEDDED_TABLES)?;
        let federal =
            Self::parse_yaml::<FederalTaxConfig>("<embedded>/federal.yaml", EMBEDDED_FEDERAL)?;
        let fica = Self::parse_yaml::<FicaConfig>("<embedded>/fica.yaml", EMBEDDED_FICA)?;
        let jurisdictions = Self::parse_yaml::<JurisdictionConfig>(
            "<embedded>/jurisdictions.yaml",
            EMBEDDED_JURISDICTIONS,
        )?;
        let garnishment = Self::parse_yaml::<GarnishmentLimits>(
            "<embedded>/garnishment.yaml",
            EMBEDDED_GARNISHMENT,
        )?;

        let tables = TaxTables::new(metadata, federal, fica, jurisdictions, garnishment)?;
        Ok(Self { tables })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&path_str, &content)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the loaded rate tables.
    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Consumes the loader, returning the rate tables.
    pub fn into_tables(self) -> TaxTables {
        self.tables
    }
}
