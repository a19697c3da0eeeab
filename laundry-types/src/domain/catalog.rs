//! Service catalog entries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::entity_id;
use super::money::Money;
use crate::error::DomainError;

entity_id! {
    /// Unique identifier for a catalog Service.
    ServiceId
}

/// A laundry service offered at a unit price (e.g. "Wash", 8000 per kg).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    #[schema(example = "Wash")]
    pub service_name: String,
    #[serde(default)]
    pub description: String,
    /// Price per unit in rupiah
    #[schema(value_type = i64, example = 8000)]
    pub unit_price: Money,
    /// Unit label, e.g. "kg" or "item"
    #[schema(example = "kg")]
    pub unit: String,
}

impl Service {
    /// Creates a new catalog entry.
    ///
    /// # Validation
    /// - Name cannot be empty
    pub fn new(
        service_name: String,
        description: String,
        unit_price: Money,
        unit: String,
    ) -> Result<Self, DomainError> {
        validate_name(&service_name)?;

        Ok(Self {
            id: ServiceId::new(),
            service_name,
            description,
            unit_price,
            unit,
        })
    }

    /// Reconstructs a service from stored fields.
    pub fn from_parts(
        id: ServiceId,
        service_name: String,
        description: String,
        unit_price: Money,
        unit: String,
    ) -> Self {
        Self {
            id,
            service_name,
            description,
            unit_price,
            unit,
        }
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Service name cannot be empty".into(),
        ));
    }
    Ok(())
}
