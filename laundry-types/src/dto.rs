//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::validate_name;
use crate::domain::customer::validate_full_name;
use crate::domain::{
    Customer, CustomerId, Money, Role, Service, ServiceId, Transaction, TransactionId,
};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Catalog & Customer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Fields of a catalog service, for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[schema(example = "Wash")]
    pub service_name: String,
    #[serde(default)]
    #[schema(example = "Wash and fold")]
    pub description: String,
    /// Price per unit in rupiah
    #[schema(value_type = i64, example = 8000)]
    pub unit_price: Money,
    #[schema(example = "kg")]
    pub unit: String,
}

impl ServiceRequest {
    /// Validates the fields and builds the catalog entry stored under `id`.
    pub fn into_service(self, id: ServiceId) -> Result<Service, DomainError> {
        validate_name(&self.service_name)?;
        Ok(Service::from_parts(
            id,
            self.service_name,
            self.description,
            self.unit_price,
            self.unit,
        ))
    }
}

/// Fields of a customer, for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[schema(example = "Siti Rahma")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

impl CustomerRequest {
    /// Validates the fields and builds the customer stored under `id`.
    pub fn into_customer(self, id: CustomerId) -> Result<Customer, DomainError> {
        validate_full_name(&self.full_name)?;
        Ok(Customer::from_parts(
            id,
            self.full_name,
            self.email,
            self.phone_number,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// One requested line: which service and how much of it.
///
/// Prices are never accepted from the client; any extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub service_id: ServiceId,
    #[schema(example = 3)]
    pub quantity: i64,
}

/// Request to open a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub customer_id: CustomerId,
    pub items: Vec<LineItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "cash")]
    pub payment_method: Option<String>,
}

/// Request to re-price an existing transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    /// Moves the transaction to another customer when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub items: Vec<LineItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Response after re-pricing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionUpdatedResponse {
    pub message: String,
    pub transaction: Transaction,
}

/// Response after deleting a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted_id: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to start paying for a transaction.
///
/// The amount is always taken from the stored transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub transaction_id: TransactionId,
    /// Generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Informational summary shown to the cashier before redirecting the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationSummary {
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[schema(value_type = i64, example = 24000)]
    pub total_amount: Money,
}

/// Response after opening a payment session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentResponse {
    pub snap_url: String,
    pub order_id: String,
    pub confirmation_data: ConfirmationSummary,
}

/// Acknowledgement returned to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    #[schema(example = "ok")]
    pub status: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Username and password, for registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "kasir1")]
    pub username: String,
    pub password: String,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Response after registering.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_items_ignore_client_prices() {
        let req: CreateTransactionRequest = serde_json::from_value(json!({
            "customerId": CustomerId::new(),
            "items": [{ "serviceId": ServiceId::new(), "quantity": 3, "unitPrice": 1 }]
        }))
        .unwrap();

        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].quantity, 3);
        assert!(req.payment_method.is_none());
    }

    #[test]
    fn test_negative_price_is_rejected_at_the_boundary() {
        let result: Result<ServiceRequest, _> = serde_json::from_value(json!({
            "serviceName": "Wash",
            "unitPrice": -5,
            "unit": "kg"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_service_name_is_rejected() {
        let req = ServiceRequest {
            service_name: "  ".into(),
            description: String::new(),
            unit_price: Money::new(1000).unwrap(),
            unit: "kg".into(),
        };
        assert!(matches!(
            req.into_service(ServiceId::new()),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_confirmation_summary_keys() {
        let summary = ConfirmationSummary {
            full_name: "Ani".into(),
            phone_number: "0811".into(),
            email: "ani@example.com".into(),
            service_name: Some("Wash".into()),
            quantity: Some(3),
            total_amount: Money::new(24000).unwrap(),
        };
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["fullName"], "Ani");
        assert_eq!(value["phoneNumber"], "0811");
        assert_eq!(value["service_name"], "Wash");
        assert_eq!(value["total_amount"], 24000);
    }
}
