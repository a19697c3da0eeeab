//! Customer records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::entity_id;
use crate::error::DomainError;

entity_id! {
    /// Unique identifier for a Customer.
    CustomerId
}

/// A laundry customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[schema(example = "Siti Rahma")]
    pub full_name: String,
    #[serde(default)]
    #[schema(example = "siti@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "08123456789")]
    pub phone_number: String,
}

impl Customer {
    /// Creates a new customer.
    ///
    /// # Validation
    /// - Full name cannot be empty
    pub fn new(
        full_name: String,
        email: String,
        phone_number: String,
    ) -> Result<Self, DomainError> {
        validate_full_name(&full_name)?;

        Ok(Self {
            id: CustomerId::new(),
            full_name,
            email,
            phone_number,
        })
    }

    pub fn from_parts(
        id: CustomerId,
        full_name: String,
        email: String,
        phone_number: String,
    ) -> Self {
        Self {
            id,
            full_name,
            email,
            phone_number,
        }
    }
}

pub(crate) fn validate_full_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Customer name cannot be empty".into(),
        ));
    }
    Ok(())
}
