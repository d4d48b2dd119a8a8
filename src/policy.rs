use crate::error::{EmissionsError, Result};
use crate::schema::Scope;
use crate::summary::PeriodSummary;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const KG_PER_TONNE: Decimal = dec!(1000);
const FULL_OFFSET: Decimal = dec!(100);

/// Offset project types available on the credit marketplace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CreditProjectType {
    RenewableEnergy,
    NatureBased,
    Industrial,
    Forestry,
    CarbonCapture,
}

impl CreditProjectType {
    /// Marketplace list price in USD per tonne CO2e.
    pub fn default_price_usd(&self) -> Decimal {
        match self {
            CreditProjectType::RenewableEnergy => dec!(25),
            CreditProjectType::NatureBased => dec!(30),
            CreditProjectType::Industrial => dec!(22),
            CreditProjectType::Forestry => dec!(28),
            CreditProjectType::CarbonCapture => dec!(35),
        }
    }
}

/// Policy values that move on market and regulatory cadence rather than on
/// emission-dataset publication cadence, so they live apart from the factor
/// table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyConfig {
    #[schemars(
        description = "Annual emissions level in tonnes CO2e above which regulatory reporting obligations apply"
    )]
    pub reporting_threshold_tonnes: Decimal,

    #[schemars(
        description = "Minimum number of computed records a reporting period needs to count as complete"
    )]
    pub minimum_records_per_period: usize,

    #[serde(default)]
    #[schemars(
        description = "Per-project credit prices in USD per tonne, overriding the marketplace defaults"
    )]
    pub credit_prices_usd_per_tonne: BTreeMap<CreditProjectType, Decimal>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reporting_threshold_tonnes: dec!(100),
            minimum_records_per_period: 3,
            credit_prices_usd_per_tonne: BTreeMap::new(),
        }
    }
}

impl PolicyConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn price_for(&self, project_type: CreditProjectType) -> Decimal {
        self.credit_prices_usd_per_tonne
            .get(&project_type)
            .copied()
            .unwrap_or_else(|| project_type.default_price_usd())
    }
}

/// Estimated cost of offsetting part of a period's emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreditEstimate {
    pub total_co2e_tonnes: Decimal,
    pub offset_percentage: Decimal,
    pub credits_needed_tonnes: Decimal,
    pub project_type: CreditProjectType,
    pub price_per_tonne_usd: Decimal,
    pub estimated_cost_usd: Decimal,
}

/// Estimates the credits needed to offset `offset_percentage` of
/// `total_co2e_kg`, priced by project type.
pub fn estimate_credits(
    total_co2e_kg: Decimal,
    offset_percentage: Decimal,
    project_type: CreditProjectType,
    policy: &PolicyConfig,
) -> Result<CreditEstimate> {
    if offset_percentage < Decimal::ZERO || offset_percentage > FULL_OFFSET {
        return Err(EmissionsError::InvalidOffsetPercentage(offset_percentage));
    }

    let total_co2e_tonnes = total_co2e_kg / KG_PER_TONNE;
    let credits_needed_tonnes = total_co2e_tonnes * offset_percentage / FULL_OFFSET;
    let price_per_tonne_usd = policy.price_for(project_type);

    Ok(CreditEstimate {
        total_co2e_tonnes,
        offset_percentage,
        credits_needed_tonnes,
        project_type,
        price_per_tonne_usd,
        estimated_cost_usd: credits_needed_tonnes * price_per_tonne_usd,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceCheck {
    pub rule_name: String,
    pub regulation: String,
    pub is_compliant: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComplianceReport {
    pub overall_compliant: bool,
    pub checks: Vec<ComplianceCheck>,
}

impl ComplianceReport {
    pub fn compliant_count(&self) -> usize {
        self.checks.iter().filter(|check| check.is_compliant).count()
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }
}

/// Runs the standing compliance rules against one period summary.
pub fn evaluate_compliance(summary: &PeriodSummary, policy: &PolicyConfig) -> ComplianceReport {
    let mut checks = Vec::new();

    let has_data = summary.record_count > 0 && summary.total_co2e > Decimal::ZERO;
    checks.push(ComplianceCheck {
        rule_name: "GRI 305 - Emissions Disclosure".to_string(),
        regulation: "GRI Standards".to_string(),
        is_compliant: has_data,
        details: format!(
            "{} records computed, {} kg CO2e reported for {}",
            summary.record_count, summary.total_co2e, summary.period
        ),
    });

    let tracks_scope2 = summary
        .breakdown_by_scope
        .get(&Scope::Scope2)
        .map_or(false, |subtotal| *subtotal > Decimal::ZERO);
    checks.push(ComplianceCheck {
        rule_name: "ISO 14064 - GHG Accounting".to_string(),
        regulation: "ISO 14064".to_string(),
        is_compliant: tracks_scope2,
        details: if tracks_scope2 {
            "Scope 2 emissions are being tracked".to_string()
        } else {
            "Need to track Scope 2 emissions".to_string()
        },
    });

    let complete = summary.record_count >= policy.minimum_records_per_period;
    checks.push(ComplianceCheck {
        rule_name: "CDP - Data Completeness".to_string(),
        regulation: "Carbon Disclosure Project".to_string(),
        is_compliant: complete,
        details: format!(
            "{} records in period (minimum {} required)",
            summary.record_count, policy.minimum_records_per_period
        ),
    });

    let total_tonnes = summary.total_co2e / KG_PER_TONNE;
    let below_threshold = total_tonnes <= policy.reporting_threshold_tonnes;
    checks.push(ComplianceCheck {
        rule_name: "Emissions Reporting Threshold".to_string(),
        regulation: "UAE Environmental".to_string(),
        is_compliant: below_threshold,
        details: format!(
            "Current emissions: {} tonnes CO2e ({} {}t threshold)",
            total_tonnes,
            if below_threshold { "below" } else { "above" },
            policy.reporting_threshold_tonnes
        ),
    });

    ComplianceReport {
        overall_compliant: checks.iter().all(|check| check.is_compliant),
        checks,
    }
}
