//! Payment attempts against the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::entity_id;
use super::money::Money;
use super::transaction::{Transaction, TransactionId};

entity_id! {
    /// Unique identifier for a Payment.
    PaymentId
}

/// Status of a payment before the gateway has reported anything.
pub const PAYMENT_PENDING: &str = "Pending";

/// One payment attempt for a transaction.
///
/// `status` holds the gateway's own vocabulary (e.g. `settlement`, `expire`)
/// verbatim once a notification has arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: PaymentId,
    pub transaction_id: TransactionId,
    /// Order identifier shared with the gateway
    #[schema(example = "7d0c1f5e-3f55-4a8e-9a53-2b1d8f3c7e10")]
    pub order_id: String,
    /// Equal to the transaction total at creation time
    #[schema(value_type = i64, example = 24000)]
    pub gross_amount: Money,
    /// Redirect URL of the gateway payment page
    pub snap_url: String,
    #[schema(example = "Pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Payment {
    /// Records a new pending payment for `transaction`.
    ///
    /// The gross amount is the transaction's stored total, copied once.
    pub fn pending(
        transaction: &Transaction,
        order_id: String,
        snap_url: String,
        payment_method: Option<String>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            transaction_id: transaction.id,
            order_id,
            gross_amount: transaction.total_amount,
            snap_url,
            status: PAYMENT_PENDING.to_string(),
            created_at: Utc::now(),
            payment_method,
        }
    }
}
