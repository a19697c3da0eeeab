//! Payment gateway port.
//!
//! The gateway hosts the payment page. This service only asks it to open a
//! session for an order and hands the redirect URL back to the cashier;
//! outcomes arrive later through the webhook.

use crate::domain::{Customer, Money};

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The gateway answered and refused the request.
    #[error("Rejected by gateway: {0}")]
    Rejected(String),

    /// The gateway could not be reached or failed internally.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

/// Customer details forwarded to the payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetail {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerDetail {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.full_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone_number.clone(),
        }
    }
}

/// A request to open a payment session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub order_id: String,
    /// Whole rupiah, exactly as stored on the transaction
    pub gross_amount: Money,
    pub customer: Option<CustomerDetail>,
}

/// An opened payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub token: String,
    pub redirect_url: String,
}

/// Port trait for payment gateways.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment session for `order_id` and returns where to send the payer.
    async fn create_session(&self, req: SessionRequest) -> Result<GatewaySession, GatewayError>;
}
