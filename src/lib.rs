//! Payroll and Garnishment Apportionment Engine
//!
//! This crate converts one worker's gross pay for one pay period into net pay:
//! it withholds federal income tax, FICA, and state and local taxes, derives
//! disposable earnings, and apportions court-ordered garnishments under the
//! CCPA limits. Every result carries an ordered audit trace explaining each
//! figure.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
