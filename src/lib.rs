//! # Carbon Accounting
//!
//! A library for turning utility-bill consumption records into CO2e
//! emission estimates and period summaries.
//!
//! ## Core Concepts
//!
//! - **Consumption Record**: one line from a utility bill (category,
//!   subtype, location, quantity, billing period), produced upstream by an
//!   extraction pipeline or manual entry
//! - **Factor Table**: versioned, immutable reference data mapping
//!   (category, subtype, country, region) to an emission factor, with a
//!   disclosed fallback ladder: exact region, country default, global
//!   default
//! - **Emission Result**: quantity × factor in exact decimal arithmetic,
//!   tagged with the GHG Protocol scope and the fallback tier that supplied
//!   the factor
//! - **Period Summary**: per-organization totals and breakdowns over a
//!   reporting window, with percent change against the preceding period
//!
//! ## Example
//!
//! ```rust,ignore
//! use carbon_accounting::*;
//! use rust_decimal_macros::dec;
//!
//! let table = FactorTable::load_from_path("data/emission_factors.json")?;
//!
//! let record = ConsumptionRecord {
//!     organization_id: "acme".to_string(),
//!     category: Category::Electricity,
//!     subtype: "grid".to_string(),
//!     country: "UAE".to_string(),
//!     region: Some("Dubai".to_string()),
//!     quantity: dec!(1250),
//!     unit: "kWh".to_string(),
//!     period: Period::calendar_month(2024, 3)?,
//!     source: None,
//! };
//!
//! let outcome = EmissionsProcessor::process(&table, &[record]);
//! let summary = summarize(
//!     &outcome.results,
//!     &Period::calendar_month(2024, 3)?,
//!     "acme",
//! );
//! ```

pub mod compute;
pub mod error;
pub mod factors;
pub mod period;
pub mod policy;
pub mod registry;
pub mod schema;
pub mod summary;
pub mod units;

pub use compute::{compute, compute_all, BatchComputation, BatchFailure, EmissionResult};
pub use error::{EmissionsError, Result};
pub use factors::{
    EmissionFactorEntry, FactorTable, FactorTableFile, MatchedScope, ResolvedFactor,
    DEFAULT_SUBTYPE, GLOBAL_COUNTRY,
};
pub use period::Period;
pub use policy::{
    estimate_credits, evaluate_compliance, ComplianceCheck, ComplianceReport, CreditEstimate,
    CreditProjectType, PolicyConfig,
};
pub use registry::FactorRegistry;
pub use schema::{Category, ConsumptionRecord, Scope, SourceMetadata};
pub use summary::{
    monthly_trend, percent_change, summarize, CategoryBreakdown, MonthlyTotal, PeriodSummary,
};

use log::{debug, info};

pub struct EmissionsProcessor;

impl EmissionsProcessor {
    /// Computes emissions for a batch of records against one table
    /// snapshot. Per-record failures are collected, never fatal to the
    /// batch.
    pub fn process(table: &FactorTable, records: &[ConsumptionRecord]) -> BatchComputation {
        info!(
            "Computing emissions for {} consumption records against factor table v{}",
            records.len(),
            table.version()
        );

        let outcome = compute_all(table, records);

        if !outcome.is_complete() {
            debug!(
                "Computed {} of {} records ({} failed)",
                outcome.computed(),
                outcome.attempted(),
                outcome.failures.len()
            );
        }

        outcome
    }

    pub fn process_and_summarize(
        table: &FactorTable,
        records: &[ConsumptionRecord],
        period: &Period,
        organization_id: &str,
    ) -> (BatchComputation, PeriodSummary) {
        let outcome = Self::process(table, records);
        let summary = summarize(&outcome.results, period, organization_id);
        (outcome, summary)
    }
}

pub fn compute_emissions(
    table: &FactorTable,
    records: &[ConsumptionRecord],
) -> BatchComputation {
    EmissionsProcessor::process(table, records)
}
