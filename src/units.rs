use crate::error::{EmissionsError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Physical dimension a consumption unit measures. Conversion is only
/// defined within a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Energy,
    Volume,
    Mass,
}

/// Canonical spelling of a raw unit or lookup key: trimmed, lowercased,
/// spaces collapsed to underscores.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Dimension and linear scale to the dimension's canonical unit
/// (kWh, m3, tonne). Returns `None` for unrecognized spellings.
fn unit_def(unit: &str) -> Option<(Dimension, Decimal)> {
    let key = normalize_key(unit).replace('³', "3");
    let def = match key.as_str() {
        "wh" => (Dimension::Energy, dec!(0.001)),
        "kwh" | "kilowatt_hour" | "kilowatt-hour" => (Dimension::Energy, dec!(1)),
        "mwh" => (Dimension::Energy, dec!(1000)),

        "l" | "liter" | "litre" => (Dimension::Volume, dec!(0.001)),
        "m3" | "cubic_meter" | "cubic_metre" => (Dimension::Volume, dec!(1)),

        "g" | "gram" => (Dimension::Mass, dec!(0.000001)),
        "kg" | "kilogram" => (Dimension::Mass, dec!(0.001)),
        "t" | "ton" | "tonne" => (Dimension::Mass, dec!(1)),

        _ => return None,
    };
    Some(def)
}

pub fn dimension_of(unit: &str) -> Option<Dimension> {
    unit_def(unit).map(|(dimension, _)| dimension)
}

/// Whether two unit spellings name the same unit.
pub fn same_unit(a: &str, b: &str) -> bool {
    normalize_key(a).replace('³', "3") == normalize_key(b).replace('³', "3")
}

/// Converts `quantity` from `from_unit` to `to_unit` through the fixed
/// linear scale table. Unrecognized units and cross-dimension conversions
/// are both unit mismatches.
pub fn convert(quantity: Decimal, from_unit: &str, to_unit: &str) -> Result<Decimal> {
    let mismatch = || EmissionsError::UnitMismatch {
        from: from_unit.to_string(),
        to: to_unit.to_string(),
    };

    let (from_dimension, from_scale) = unit_def(from_unit).ok_or_else(mismatch)?;
    let (to_dimension, to_scale) = unit_def(to_unit).ok_or_else(mismatch)?;

    if from_dimension != to_dimension {
        return Err(mismatch());
    }

    Ok(quantity * from_scale / to_scale)
}
