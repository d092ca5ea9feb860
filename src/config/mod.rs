//! Configuration loading and management for the Garnishment Engine.
//!
//! This module loads the statutory rate tables (federal brackets, FICA
//! rates, state and city rates, CCPA limits) from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use garnishment_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/us_2025").unwrap();
//! println!("Loaded tables: {}", config.tables().metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ByFilingStatus, FederalTaxConfig, FicaConfig, GarnishmentLimits, Jurisdiction,
    JurisdictionConfig, LocalTaxTable, StateTaxRule, TablesMetadata, TaxBracket, TaxTables,
    normalize_city,
};
