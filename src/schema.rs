use crate::period::Period;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[schemars(
        description = "Purchased grid electricity from a utility bill, measured in energy units such as kWh (Scope 2)"
    )]
    Electricity,

    #[schemars(
        description = "Combusted fuels such as diesel, petrol, natural gas or LPG, measured in liters or cubic meters (Scope 1)"
    )]
    Fuel,

    #[schemars(
        description = "Municipal water supply and treatment, measured in cubic meters (Scope 3)"
    )]
    Water,

    #[schemars(
        description = "Waste sent for disposal, with the disposal method as subtype, measured in mass units (Scope 3)"
    )]
    Waste,
}

impl Category {
    /// GHG Protocol scope the category reports under.
    pub fn scope(&self) -> Scope {
        match self {
            Category::Fuel => Scope::Scope1,
            Category::Electricity => Scope::Scope2,
            Category::Water | Category::Waste => Scope::Scope3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electricity => "electricity",
            Category::Fuel => "fuel",
            Category::Water => "water",
            Category::Waste => "waste",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Scope {
    #[serde(rename = "Scope 1")]
    #[schemars(description = "Direct emissions from sources owned or controlled by the organization")]
    Scope1,

    #[serde(rename = "Scope 2")]
    #[schemars(description = "Indirect emissions from the generation of purchased energy")]
    Scope2,

    #[serde(rename = "Scope 3")]
    #[schemars(description = "All other indirect emissions occurring in the value chain")]
    Scope3,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Scope1 => f.write_str("Scope 1"),
            Scope::Scope2 => f.write_str("Scope 2"),
            Scope::Scope3 => f.write_str("Scope 3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceMetadata {
    #[schemars(description = "Name of the uploaded bill or document this record was extracted from")]
    pub document_name: String,

    #[schemars(description = "The original text snippet the quantity was read from, if available")]
    pub original_text: Option<String>,
}

/// A single consumption line extracted from a utility bill.
///
/// Records arrive from an upstream extraction pipeline (OCR/AI or manual
/// entry) and are immutable once emissions have been computed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsumptionRecord {
    #[schemars(description = "Identifier of the organization the bill belongs to")]
    pub organization_id: String,

    #[schemars(description = "Utility category of the bill")]
    pub category: Category,

    #[schemars(
        description = "Subtype within the category: grid mix for electricity (e.g. 'grid'), fuel type (e.g. 'diesel'), water service (e.g. 'water_supply'), or waste disposal method (e.g. 'landfill')"
    )]
    pub subtype: String,

    #[schemars(description = "Country the consumption occurred in, e.g. 'UAE'")]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Optional sub-national region (state, emirate, grid zone) for region-specific factors"
    )]
    pub region: Option<String>,

    #[schemars(description = "Consumption quantity as printed on the bill. Must be non-negative")]
    pub quantity: Decimal,

    #[schemars(description = "Unit the quantity was billed in, e.g. 'kWh', 'L', 'm3', 'kg'")]
    pub unit: String,

    #[schemars(description = "Billing period the consumption covers (inclusive date range)")]
    pub period: Period,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Provenance of this record in the source document")]
    pub source: Option<SourceMetadata>,
}

impl ConsumptionRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ConsumptionRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
