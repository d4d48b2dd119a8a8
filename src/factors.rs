use crate::error::{EmissionsError, Result};
use crate::schema::Category;
use crate::units::{self, normalize_key};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Country key of worldwide-average entries.
pub const GLOBAL_COUNTRY: &str = "global";

/// Subtype key of the category-wide fallback entry every category must carry.
pub const DEFAULT_SUBTYPE: &str = "default";

/// One row of the emission factor reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmissionFactorEntry {
    #[schemars(description = "Utility category this factor applies to")]
    pub category: Category,

    #[schemars(
        description = "Subtype within the category: grid mix ('grid'), fuel type ('diesel'), water service ('water_supply'), waste disposal method ('landfill'), or 'default' for the category-wide fallback"
    )]
    pub subtype: String,

    #[schemars(
        description = "Country the factor was published for, or 'global' for the worldwide average"
    )]
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Optional sub-national region (state, emirate, grid zone). Omit for the country-level factor"
    )]
    pub region: Option<String>,

    #[schemars(description = "Mass of CO2-equivalent per consumption unit. Must be positive")]
    pub factor: Decimal,

    #[schemars(
        description = "Factor unit in the form '<mass> CO2e/<consumption unit>', e.g. 'kg CO2e/kWh'"
    )]
    pub unit: String,
}

impl EmissionFactorEntry {
    /// The consumption unit this factor expects: the denominator of `unit`.
    pub fn consumption_unit(&self) -> &str {
        match self.unit.rsplit_once('/') {
            Some((_, denominator)) => denominator.trim(),
            None => "",
        }
    }

    fn key(&self) -> FactorKey {
        (
            self.category,
            normalize_key(&self.subtype),
            normalize_key(&self.country),
            self.region.as_deref().map(normalize_key),
        )
    }

    fn key_string(&self) -> String {
        match &self.region {
            Some(region) => format!(
                "{}/{}/{}/{}",
                self.category, self.subtype, self.country, region
            ),
            None => format!("{}/{}/{}", self.category, self.subtype, self.country),
        }
    }
}

type FactorKey = (Category, String, String, Option<String>);

/// On-disk format of the reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FactorTableFile {
    #[schemars(description = "Version of the reference dataset, e.g. '2024.1'")]
    pub version: String,

    #[schemars(description = "Every emission factor entry in the dataset")]
    pub factors: Vec<EmissionFactorEntry>,
}

impl FactorTableFile {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FactorTableFile)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Which tier of the lookup ladder satisfied a resolution. Reported so
/// callers and reports can disclose the approximation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MatchedScope {
    /// The region-specific entry matched.
    ExactRegion,
    /// No entry for the region; fell back to the country-level factor.
    CountryDefault,
    /// No entry for the country; fell back to the global or category-wide
    /// default.
    GlobalDefault,
}

impl fmt::Display for MatchedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedScope::ExactRegion => f.write_str("exact-region"),
            MatchedScope::CountryDefault => f.write_str("country-default"),
            MatchedScope::GlobalDefault => f.write_str("global-default"),
        }
    }
}

/// A successful factor lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFactor {
    pub entry: EmissionFactorEntry,
    pub matched_scope: MatchedScope,
}

impl ResolvedFactor {
    pub fn factor(&self) -> Decimal {
        self.entry.factor
    }

    pub fn unit(&self) -> &str {
        &self.entry.unit
    }
}

/// A validated, immutable snapshot of the emission factor reference data.
///
/// Built once (at startup or on explicit reload) and shared read-only;
/// lookups never mutate it.
#[derive(Debug, Clone)]
pub struct FactorTable {
    version: String,
    entries: BTreeMap<FactorKey, EmissionFactorEntry>,
    categories: BTreeSet<Category>,
}

impl FactorTable {
    pub fn new(version: impl Into<String>, entries: Vec<EmissionFactorEntry>) -> Result<Self> {
        let mut keyed: BTreeMap<FactorKey, EmissionFactorEntry> = BTreeMap::new();
        let mut categories = BTreeSet::new();

        for entry in entries {
            if entry.factor <= Decimal::ZERO {
                return Err(EmissionsError::InvalidFactor {
                    category: entry.category,
                    subtype: entry.subtype,
                    value: entry.factor,
                });
            }

            let consumption_unit = entry.consumption_unit();
            if consumption_unit.is_empty() || units::dimension_of(consumption_unit).is_none() {
                return Err(EmissionsError::InvalidFactorUnit(entry.unit));
            }

            categories.insert(entry.category);
            let key = entry.key();
            if keyed.insert(key, entry.clone()).is_some() {
                return Err(EmissionsError::DuplicateFactor(entry.key_string()));
            }
        }

        // Resolution must be total for every category in the table, so each
        // one carries a global default row.
        for category in &categories {
            let default_key = (
                *category,
                DEFAULT_SUBTYPE.to_string(),
                GLOBAL_COUNTRY.to_string(),
                None,
            );
            if !keyed.contains_key(&default_key) {
                return Err(EmissionsError::MissingCategoryDefault(*category));
            }
        }

        Ok(Self {
            version: version.into(),
            entries: keyed,
            categories,
        })
    }

    pub fn from_file(file: FactorTableFile) -> Result<Self> {
        Self::new(file.version, file.factors)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: FactorTableFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let file: FactorTableFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &EmissionFactorEntry> {
        self.entries.values()
    }

    /// Looks up the factor for a consumption source, walking the fallback
    /// ladder: exact region, country level, global subtype, category-wide
    /// default. Fails only when the category has no entries at all.
    pub fn resolve(
        &self,
        category: Category,
        subtype: &str,
        country: &str,
        region: Option<&str>,
    ) -> Result<ResolvedFactor> {
        let subtype = normalize_key(subtype);
        let country = normalize_key(country);

        if let Some(region) = region {
            let key = (
                category,
                subtype.clone(),
                country.clone(),
                Some(normalize_key(region)),
            );
            if let Some(entry) = self.entries.get(&key) {
                return Ok(ResolvedFactor {
                    entry: entry.clone(),
                    matched_scope: MatchedScope::ExactRegion,
                });
            }
        }

        let country_key = (category, subtype.clone(), country, None);
        if let Some(entry) = self.entries.get(&country_key) {
            return Ok(ResolvedFactor {
                entry: entry.clone(),
                matched_scope: MatchedScope::CountryDefault,
            });
        }

        let global_key = (category, subtype, GLOBAL_COUNTRY.to_string(), None);
        if let Some(entry) = self.entries.get(&global_key) {
            return Ok(ResolvedFactor {
                entry: entry.clone(),
                matched_scope: MatchedScope::GlobalDefault,
            });
        }

        let default_key = (
            category,
            DEFAULT_SUBTYPE.to_string(),
            GLOBAL_COUNTRY.to_string(),
            None,
        );
        if let Some(entry) = self.entries.get(&default_key) {
            return Ok(ResolvedFactor {
                entry: entry.clone(),
                matched_scope: MatchedScope::GlobalDefault,
            });
        }

        Err(EmissionsError::UnknownFactor(category))
    }
}
