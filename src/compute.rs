use crate::error::{EmissionsError, Result};
use crate::factors::{EmissionFactorEntry, FactorTable, MatchedScope, ResolvedFactor};
use crate::schema::{ConsumptionRecord, Scope};
use crate::units;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const KG_PER_TONNE: Decimal = dec!(1000);

/// The CO2e computed for one consumption record.
///
/// Carries the record and the factor entry it was computed from, so the
/// estimate stays auditable after the fact. Recomputation means producing a
/// new result from a new record or a new table version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionResult {
    pub record: ConsumptionRecord,

    /// The reference entry the factor came from.
    pub factor: EmissionFactorEntry,

    /// Which fallback tier supplied the factor.
    pub matched_scope: MatchedScope,

    /// GHG Protocol scope of the record's category.
    pub scope: Scope,

    /// Total emissions in kg CO2e.
    pub total_co2e: Decimal,

    pub computed_at: DateTime<Utc>,
}

impl EmissionResult {
    pub fn total_co2e_tonnes(&self) -> Decimal {
        self.total_co2e / KG_PER_TONNE
    }
}

/// Computes the emissions for one record against an already-resolved factor.
///
/// The record's quantity is converted to the factor's consumption unit when
/// the bill was issued in a different one (e.g. Wh against a per-kWh
/// factor). Negative quantities are rejected, never clamped to zero.
pub fn compute(record: &ConsumptionRecord, resolved: &ResolvedFactor) -> Result<EmissionResult> {
    if record.quantity < Decimal::ZERO {
        return Err(EmissionsError::InvalidQuantity(record.quantity));
    }

    let target_unit = resolved.entry.consumption_unit();
    let quantity = if units::same_unit(&record.unit, target_unit) {
        record.quantity
    } else {
        units::convert(record.quantity, &record.unit, target_unit)?
    };

    Ok(EmissionResult {
        record: record.clone(),
        factor: resolved.entry.clone(),
        matched_scope: resolved.matched_scope,
        scope: record.category.scope(),
        total_co2e: quantity * resolved.entry.factor,
        computed_at: Utc::now(),
    })
}

/// A record that could not be computed, with the reason.
#[derive(Debug)]
pub struct BatchFailure {
    pub record: ConsumptionRecord,
    pub error: EmissionsError,
}

/// Outcome of computing a batch of records. Failures are collected per
/// record instead of aborting the batch, so callers can report
/// "N of M records computed".
#[derive(Debug, Default)]
pub struct BatchComputation {
    pub results: Vec<EmissionResult>,
    pub failures: Vec<BatchFailure>,
}

impl BatchComputation {
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn computed(&self) -> usize {
        self.results.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves and computes every record in the batch against one table
/// snapshot.
pub fn compute_all(table: &FactorTable, records: &[ConsumptionRecord]) -> BatchComputation {
    let mut outcome = BatchComputation::default();

    for record in records {
        let computed = table
            .resolve(
                record.category,
                &record.subtype,
                &record.country,
                record.region.as_deref(),
            )
            .and_then(|resolved| compute(record, &resolved));

        match computed {
            Ok(result) => outcome.results.push(result),
            Err(error) => {
                debug!(
                    "Skipping {}/{} record for organization {}: {}",
                    record.category, record.subtype, record.organization_id, error
                );
                outcome.failures.push(BatchFailure {
                    record: record.clone(),
                    error,
                });
            }
        }
    }

    outcome
}
