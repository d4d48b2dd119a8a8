use crate::schema::Category;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmissionsError {
    #[error("No emission factors registered for category '{0}'")]
    UnknownFactor(Category),

    #[error("Incompatible units: cannot convert '{from}' to '{to}'")]
    UnitMismatch { from: String, to: String },

    #[error("Invalid quantity {0}: must be non-negative")]
    InvalidQuantity(Decimal),

    #[error("Invalid emission factor {value} for {category}/{subtype}: must be positive")]
    InvalidFactor {
        category: Category,
        subtype: String,
        value: Decimal,
    },

    #[error("Unrecognized factor unit '{0}': expected '<mass> CO2e/<consumption unit>'")]
    InvalidFactorUnit(String),

    #[error("Duplicate emission factor entry: {0}")]
    DuplicateFactor(String),

    #[error("Category '{0}' has no global default entry")]
    MissingCategoryDefault(Category),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid offset percentage {0}: must be between 0 and 100")]
    InvalidOffsetPercentage(Decimal),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmissionsError>;
