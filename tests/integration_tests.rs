use anyhow::Result;
use carbon_accounting::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn dataset_path() -> String {
    format!(
        "{}/data/emission_factors.json",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn record(
    organization_id: &str,
    category: Category,
    subtype: &str,
    country: &str,
    region: Option<&str>,
    quantity: Decimal,
    unit: &str,
    period: Period,
    document: &str,
) -> ConsumptionRecord {
    ConsumptionRecord {
        organization_id: organization_id.to_string(),
        category,
        subtype: subtype.to_string(),
        country: country.to_string(),
        region: region.map(str::to_string),
        quantity,
        unit: unit.to_string(),
        period,
        source: Some(SourceMetadata {
            document_name: document.to_string(),
            original_text: None,
        }),
    }
}

#[test]
fn test_shipped_dataset_loads_and_is_total() -> Result<()> {
    let table = FactorTable::load_from_path(dataset_path())?;

    assert_eq!(table.version(), "2024.1");
    assert!(table.len() >= 20);

    // Every category in the dataset resolves for an arbitrary unknown
    // location, disclosing the fallback instead of failing.
    for category in table.categories() {
        let resolved = table.resolve(category, "anything", "Nowhereland", Some("Nowhere"))?;
        assert_eq!(resolved.matched_scope, MatchedScope::GlobalDefault);
        assert!(resolved.factor() > Decimal::ZERO);
    }

    Ok(())
}

#[test]
fn test_two_month_reporting_cycle() -> Result<()> {
    let table = FactorTable::load_from_path(dataset_path())?;

    let february = Period::calendar_month(2024, 2)?;
    let march = Period::calendar_month(2024, 3)?;

    let records = vec![
        // February baseline
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            dec!(1000),
            "kWh",
            february,
            "dewa-feb.pdf",
        ),
        record(
            "acme",
            Category::Fuel,
            "diesel",
            "UAE",
            None,
            dec!(150),
            "L",
            february,
            "fleet-feb.pdf",
        ),
        // March activity, including a bill issued in Wh and a waste ticket
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            dec!(1250000),
            "Wh",
            march,
            "dewa-mar.pdf",
        ),
        record(
            "acme",
            Category::Fuel,
            "diesel",
            "UAE",
            None,
            dec!(200),
            "L",
            march,
            "fleet-mar.pdf",
        ),
        record(
            "acme",
            Category::Water,
            "water_supply",
            "UAE",
            None,
            dec!(40),
            "m3",
            march,
            "water-mar.pdf",
        ),
        record(
            "acme",
            Category::Waste,
            "landfill",
            "UAE",
            None,
            dec!(500),
            "kg",
            march,
            "waste-mar.pdf",
        ),
        // Another tenant's bill, ignored by acme's summary
        record(
            "globex",
            Category::Electricity,
            "grid",
            "USA",
            Some("California"),
            dec!(9000),
            "kWh",
            march,
            "pge-mar.pdf",
        ),
    ];

    let (outcome, summary) =
        EmissionsProcessor::process_and_summarize(&table, &records, &march, "acme");

    assert!(outcome.is_complete(), "all records should compute");
    assert_eq!(outcome.computed(), 7);

    // March, acme only:
    //   electricity 1250 kWh * 0.432          = 540.0
    //   diesel       200 L   * 2.68           = 536.0
    //   water         40 m3  * 0.344          = 13.76
    //   waste        0.5 t   * 583            = 291.5
    assert_eq!(summary.record_count, 4);
    assert_eq!(summary.total_co2e, dec!(1381.26));

    let order: Vec<Category> = summary
        .breakdown_by_category
        .iter()
        .map(|b| b.category)
        .collect();
    assert_eq!(
        order,
        vec![
            Category::Electricity,
            Category::Fuel,
            Category::Waste,
            Category::Water
        ]
    );

    assert_eq!(
        summary.breakdown_by_scope.get(&Scope::Scope1),
        Some(&dec!(536.0))
    );
    assert_eq!(
        summary.breakdown_by_scope.get(&Scope::Scope2),
        Some(&dec!(540.0))
    );
    assert_eq!(
        summary.breakdown_by_scope.get(&Scope::Scope3),
        Some(&dec!(305.26))
    );

    // February baseline: 1000 * 0.432 + 150 * 2.68 = 834.0
    assert_eq!(summary.previous_period_total, dec!(834.0));
    // (1381.26 - 834.0) / 834.0 * 100
    let expected_change = (dec!(1381.26) - dec!(834.0)) / dec!(834.0) * dec!(100);
    assert_eq!(summary.percent_change, Some(expected_change));

    Ok(())
}

#[test]
fn test_fallback_disclosure_in_results() -> Result<()> {
    let table = FactorTable::load_from_path(dataset_path())?;
    let march = Period::calendar_month(2024, 3)?;

    let records = vec![
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            dec!(100),
            "kWh",
            march,
            "a.pdf",
        ),
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Sharjah"),
            dec!(100),
            "kWh",
            march,
            "b.pdf",
        ),
        record(
            "acme",
            Category::Electricity,
            "grid",
            "France",
            None,
            dec!(100),
            "kWh",
            march,
            "c.pdf",
        ),
    ];

    let outcome = EmissionsProcessor::process(&table, &records);
    assert!(outcome.is_complete());

    let scopes: Vec<MatchedScope> = outcome
        .results
        .iter()
        .map(|result| result.matched_scope)
        .collect();
    assert_eq!(
        scopes,
        vec![
            MatchedScope::ExactRegion,
            MatchedScope::CountryDefault,
            MatchedScope::GlobalDefault
        ]
    );

    Ok(())
}

#[test]
fn test_registry_reload_mid_flight() -> Result<()> {
    let registry = FactorRegistry::load_from_path(dataset_path())?;
    let before = registry.snapshot();

    let revised = FactorTable::from_json_str(
        r#"{
            "version": "2024.2",
            "factors": [
                {"category": "electricity", "subtype": "grid", "country": "UAE", "region": "Dubai", "factor": "0.418", "unit": "kg CO2e/kWh"},
                {"category": "electricity", "subtype": "default", "country": "global", "factor": "0.462", "unit": "kg CO2e/kWh"}
            ]
        }"#,
    )?;
    registry.reload(revised);
    let after = registry.snapshot();

    let old = before.resolve(Category::Electricity, "grid", "UAE", Some("Dubai"))?;
    let new = after.resolve(Category::Electricity, "grid", "UAE", Some("Dubai"))?;

    assert_eq!(old.factor(), dec!(0.432));
    assert_eq!(new.factor(), dec!(0.418));
    assert_eq!(before.version(), "2024.1");
    assert_eq!(after.version(), "2024.2");

    Ok(())
}

#[test]
fn test_dashboard_trend_and_policy_cycle() -> Result<()> {
    let table = FactorTable::load_from_path(dataset_path())?;

    let months: Vec<Period> = (1..=3)
        .map(|month| Period::calendar_month(2024, month))
        .collect::<std::result::Result<_, _>>()?;

    let mut records = Vec::new();
    for (index, month) in months.iter().enumerate() {
        let kwh = dec!(1000) + dec!(250) * Decimal::from(index as u32);
        records.push(record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            kwh,
            "kWh",
            *month,
            "dewa.pdf",
        ));
        records.push(record(
            "acme",
            Category::Fuel,
            "diesel",
            "UAE",
            None,
            dec!(100),
            "L",
            *month,
            "fleet.pdf",
        ));
        records.push(record(
            "acme",
            Category::Water,
            "water_supply",
            "UAE",
            None,
            dec!(30),
            "m3",
            *month,
            "water.pdf",
        ));
    }

    let outcome = EmissionsProcessor::process(&table, &records);
    assert!(outcome.is_complete());

    let march = months[2];
    let trend = monthly_trend(&outcome.results, "acme", march, 3);
    assert_eq!(trend.len(), 3);
    assert!(trend[0].total_co2e < trend[1].total_co2e);
    assert!(trend[1].total_co2e < trend[2].total_co2e);

    let summary = summarize(&outcome.results, &march, "acme");
    assert_eq!(summary.record_count, 3);

    let policy = PolicyConfig::default();
    let report = evaluate_compliance(&summary, &policy);
    assert!(report.overall_compliant, "well under the 100t threshold");

    let estimate = estimate_credits(
        summary.total_co2e,
        dec!(50),
        CreditProjectType::RenewableEnergy,
        &policy,
    )?;
    assert_eq!(
        estimate.credits_needed_tonnes,
        summary.total_co2e / dec!(1000) / dec!(2)
    );
    assert_eq!(
        estimate.estimated_cost_usd,
        estimate.credits_needed_tonnes * dec!(25)
    );

    Ok(())
}

#[test]
fn test_partial_failure_reporting() -> Result<()> {
    let table = FactorTable::load_from_path(dataset_path())?;
    let march = Period::calendar_month(2024, 3)?;

    let records = vec![
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            dec!(1250),
            "kWh",
            march,
            "good.pdf",
        ),
        // Billed in liters against a per-kWh factor
        record(
            "acme",
            Category::Electricity,
            "grid",
            "UAE",
            Some("Dubai"),
            dec!(300),
            "L",
            march,
            "bad-unit.pdf",
        ),
        // Negative quantity slipped through upstream validation
        record(
            "acme",
            Category::Fuel,
            "diesel",
            "UAE",
            None,
            dec!(-10),
            "L",
            march,
            "bad-quantity.pdf",
        ),
    ];

    let (outcome, summary) =
        EmissionsProcessor::process_and_summarize(&table, &records, &march, "acme");

    assert_eq!(outcome.computed(), 1);
    assert_eq!(outcome.attempted(), 3);
    assert!(matches!(
        outcome.failures[0].error,
        EmissionsError::UnitMismatch { .. }
    ));
    assert!(matches!(
        outcome.failures[1].error,
        EmissionsError::InvalidQuantity(_)
    ));

    // The summary covers what did compute.
    assert_eq!(summary.record_count, 1);
    assert_eq!(summary.total_co2e, dec!(540.0));

    Ok(())
}
