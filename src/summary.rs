use crate::compute::EmissionResult;
use crate::period::Period;
use crate::schema::{Category, Scope};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub total_co2e: Decimal,
}

/// Aggregated emissions for one organization over one reporting window.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PeriodSummary {
    pub organization_id: String,
    pub period: Period,

    /// Total emissions in kg CO2e.
    pub total_co2e: Decimal,

    /// Per-category subtotals, largest contributor first; ties break by
    /// category name ascending so output is stable.
    pub breakdown_by_category: Vec<CategoryBreakdown>,

    pub breakdown_by_scope: BTreeMap<Scope, Decimal>,

    /// How many results fell inside the window.
    pub record_count: usize,

    /// Total for the immediately preceding period of equal length.
    pub previous_period_total: Decimal,

    /// Month-over-month style change in percent. `None` when the previous
    /// period total is zero: there is no baseline to compare against.
    pub percent_change: Option<Decimal>,
}

/// `(current - previous) / previous * 100`, or `None` when there is no
/// prior baseline.
pub fn percent_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        None
    } else {
        Some((current - previous) / previous * dec!(100))
    }
}

fn in_window(result: &EmissionResult, period: &Period, organization_id: &str) -> bool {
    result.record.organization_id == organization_id
        && period.contains_period(&result.record.period)
}

fn total_for(results: &[EmissionResult], period: &Period, organization_id: &str) -> Decimal {
    results
        .iter()
        .filter(|result| in_window(result, period, organization_id))
        .map(|result| result.total_co2e)
        .sum()
}

/// Rolls a set of computed results up into a period summary for one
/// organization. A result belongs to the window when its record's whole
/// billing period falls inside it (inclusive bounds).
///
/// An empty window produces a zero total and an empty breakdown, not an
/// error.
pub fn summarize(
    results: &[EmissionResult],
    period: &Period,
    organization_id: &str,
) -> PeriodSummary {
    let mut total = Decimal::ZERO;
    let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
    let mut by_scope: BTreeMap<Scope, Decimal> = BTreeMap::new();
    let mut record_count = 0usize;

    for result in results
        .iter()
        .filter(|result| in_window(result, period, organization_id))
    {
        total += result.total_co2e;
        *by_category.entry(result.record.category).or_insert(Decimal::ZERO) += result.total_co2e;
        *by_scope.entry(result.scope).or_insert(Decimal::ZERO) += result.total_co2e;
        record_count += 1;
    }

    let mut breakdown_by_category: Vec<CategoryBreakdown> = by_category
        .into_iter()
        .map(|(category, total_co2e)| CategoryBreakdown {
            category,
            total_co2e,
        })
        .collect();
    breakdown_by_category.sort_by(|a, b| {
        b.total_co2e
            .cmp(&a.total_co2e)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });

    let previous = period.preceding();
    let previous_period_total = total_for(results, &previous, organization_id);

    PeriodSummary {
        organization_id: organization_id.to_string(),
        period: *period,
        total_co2e: total,
        breakdown_by_category,
        breakdown_by_scope: by_scope,
        record_count,
        previous_period_total,
        percent_change: percent_change(total, previous_period_total),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyTotal {
    pub period: Period,
    pub total_co2e: Decimal,
}

/// Emissions per month for the `months` windows ending at `last`,
/// oldest first. Feeds dashboard trend charts.
pub fn monthly_trend(
    results: &[EmissionResult],
    organization_id: &str,
    last: Period,
    months: usize,
) -> Vec<MonthlyTotal> {
    let mut windows = Vec::with_capacity(months);
    let mut current = last;
    for _ in 0..months {
        windows.push(current);
        current = current.preceding();
    }
    windows.reverse();

    windows
        .into_iter()
        .map(|period| MonthlyTotal {
            total_co2e: total_for(results, &period, organization_id),
            period,
        })
        .collect()
}
