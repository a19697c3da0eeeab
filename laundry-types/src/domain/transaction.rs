//! Transaction domain model.
//!
//! A transaction is a priced snapshot: every line item carries a copy of the
//! catalog service as it was when the transaction was priced, and the total is
//! always derived from those line items, never taken from the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::{Service, ServiceId};
use super::customer::{Customer, CustomerId};
use super::id::entity_id;
use super::money::Money;
use crate::error::DomainError;

entity_id! {
    /// Unique identifier for a Transaction.
    TransactionId
}

entity_id! {
    /// Unique identifier for a line item within a Transaction.
    TransactionItemId
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    /// Maps a gateway notification status onto a transaction status.
    ///
    /// Returns `None` for statuses that say nothing about the outcome
    /// (e.g. `authorize`, `refund`), leaving the transaction as it is.
    pub fn from_gateway(status: &str) -> Option<Self> {
        match status.to_ascii_lowercase().as_str() {
            "settlement" | "capture" | "success" => Some(Self::Paid),
            "deny" | "failure" | "failed" => Some(Self::Failed),
            "cancel" | "expire" | "expired" => Some(Self::Cancelled),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Status after a gateway notification for one of the transaction's
    /// payment attempts. `Paid` is final: a late notification for another
    /// attempt (an abandoned session expiring, a redelivered `pending`) never
    /// moves a paid transaction.
    pub fn after_notification(self, gateway_status: &str) -> Self {
        if self == Self::Paid {
            return self;
        }
        Self::from_gateway(gateway_status).unwrap_or(self)
    }
}

impl AsRef<str> for TransactionStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "Unknown transaction status: {}",
                other
            ))),
        }
    }
}

/// One priced (service, quantity) entry of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: TransactionItemId,
    pub service_id: ServiceId,
    /// Catalog entry as it was when the item was priced
    pub service: Service,
    #[schema(example = 3)]
    pub quantity: i64,
    /// Unit price copied from the catalog
    #[schema(value_type = i64, example = 8000)]
    pub unit_price: Money,
    /// `quantity * unit_price`
    #[schema(value_type = i64, example = 24000)]
    pub total_price: Money,
}

impl TransactionItem {
    /// Prices a line against the given catalog entry.
    pub fn price(
        id: TransactionItemId,
        service: Service,
        quantity: i64,
    ) -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity {
                service_id: service.id,
                quantity,
            });
        }

        let total_price = service.unit_price.checked_mul(quantity)?;

        Ok(Self {
            id,
            service_id: service.id,
            unit_price: service.unit_price,
            total_price,
            quantity,
            service,
        })
    }
}

/// Sums the line totals of a set of items.
pub fn total_of(items: &[TransactionItem]) -> Result<Money, DomainError> {
    items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total_price))
}

/// Prices resolved lines, reusing `existing` item ids by position.
fn price_lines(
    existing: &[TransactionItemId],
    lines: Vec<(Service, i64)>,
) -> Result<Vec<TransactionItem>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::EmptyTransaction);
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, (service, quantity))| {
            let id = existing.get(i).copied().unwrap_or_default();
            TransactionItem::price(id, service, quantity)
        })
        .collect()
}

/// A customer's order of laundry services.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    /// Customer details for display; not the source of truth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    pub transaction_date: DateTime<Utc>,
    pub items: Vec<TransactionItem>,
    #[schema(value_type = i64, example = 24000)]
    pub total_amount: Money,
    #[serde(default)]
    pub payment_method: String,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Opens a new pending transaction from resolved catalog lines.
    ///
    /// `lines` pairs each requested quantity with the service as currently
    /// stored in the catalog; the client never supplies prices.
    pub fn open(
        customer: Customer,
        lines: Vec<(Service, i64)>,
        payment_method: String,
    ) -> Result<Self, DomainError> {
        let items = price_lines(&[], lines)?;
        let total_amount = total_of(&items)?;

        Ok(Self {
            id: TransactionId::new(),
            customer_id: customer.id,
            customer: Some(customer),
            transaction_date: Utc::now(),
            items,
            total_amount,
            payment_method,
            status: TransactionStatus::Pending,
        })
    }

    /// Re-prices the transaction against current catalog lines.
    ///
    /// Item ids are kept by position; extra lines get fresh ids.
    /// The transaction date moves to now.
    pub fn reprice(&mut self, lines: Vec<(Service, i64)>) -> Result<(), DomainError> {
        let existing: Vec<TransactionItemId> = self.items.iter().map(|item| item.id).collect();
        let items = price_lines(&existing, lines)?;
        let total_amount = total_of(&items)?;

        self.items = items;
        self.total_amount = total_amount;
        self.transaction_date = Utc::now();
        Ok(())
    }

    /// Points the transaction at a different customer.
    pub fn reassign(&mut self, customer: Customer) {
        self.customer_id = customer.id;
        self.customer = Some(customer);
    }

    /// Replaces the denormalized customer if a fresh copy was found.
    pub fn attach_customer(mut self, customer: Option<Customer>) -> Self {
        if customer.is_some() {
            self.customer = customer;
        }
        self
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransactionId,
        customer_id: CustomerId,
        customer: Option<Customer>,
        transaction_date: DateTime<Utc>,
        items: Vec<TransactionItem>,
        total_amount: Money,
        payment_method: String,
        status: TransactionStatus,
    ) -> Self {
        Self {
            id,
            customer_id,
            customer,
            transaction_date,
            items,
            total_amount,
            payment_method,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, price: i64) -> Service {
        Service::new(
            name.into(),
            String::new(),
            Money::new(price).unwrap(),
            "kg".into(),
        )
        .unwrap()
    }

    fn customer() -> Customer {
        Customer::new("Budi".into(), "budi@example.com".into(), "0811".into()).unwrap()
    }

    #[test]
    fn test_open_prices_every_line() {
        let wash = service("Wash", 8000);
        let iron = service("Iron", 5000);

        let tx = Transaction::open(
            customer(),
            vec![(wash.clone(), 3), (iron.clone(), 2)],
            "cash".into(),
        )
        .unwrap();

        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.items.len(), 2);
        assert_eq!(tx.items[0].service_id, wash.id);
        assert_eq!(tx.items[0].unit_price.amount(), 8000);
        assert_eq!(tx.items[0].total_price.amount(), 24000);
        assert_eq!(tx.items[1].total_price.amount(), 10000);
        assert_eq!(tx.total_amount.amount(), 34000);
        assert_eq!(tx.total_amount, total_of(&tx.items).unwrap());
    }

    #[test]
    fn test_open_rejects_empty_items() {
        let result = Transaction::open(customer(), vec![], String::new());
        assert!(matches!(result, Err(DomainError::EmptyTransaction)));
    }

    #[test]
    fn test_open_rejects_non_positive_quantity() {
        let result = Transaction::open(customer(), vec![(service("Wash", 8000), 0)], String::new());
        assert!(matches!(
            result,
            Err(DomainError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_reprice_uses_new_prices_and_keeps_ids_by_position() {
        let mut wash = service("Wash", 8000);
        let mut tx = Transaction::open(customer(), vec![(wash.clone(), 1)], String::new()).unwrap();
        let first_id = tx.items[0].id;
        let opened_at = tx.transaction_date;

        wash.unit_price = Money::new(9000).unwrap();
        let dry = service("Dry", 4000);
        tx.reprice(vec![(wash, 2), (dry, 1)]).unwrap();

        assert_eq!(tx.items[0].id, first_id);
        assert_ne!(tx.items[1].id, first_id);
        assert_eq!(tx.items[0].unit_price.amount(), 9000);
        assert_eq!(tx.total_amount.amount(), 22000);
        assert!(tx.transaction_date >= opened_at);
    }

    #[test]
    fn test_snapshot_is_independent_of_catalog_changes() {
        let mut wash = service("Wash", 8000);
        let tx = Transaction::open(customer(), vec![(wash.clone(), 1)], String::new()).unwrap();

        wash.unit_price = Money::new(12000).unwrap();

        assert_eq!(tx.items[0].service.unit_price.amount(), 8000);
        assert_eq!(tx.items[0].unit_price.amount(), 8000);
    }

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(
            TransactionStatus::from_gateway("settlement"),
            Some(TransactionStatus::Paid)
        );
        assert_eq!(
            TransactionStatus::from_gateway("capture"),
            Some(TransactionStatus::Paid)
        );
        assert_eq!(
            TransactionStatus::from_gateway("expire"),
            Some(TransactionStatus::Cancelled)
        );
        assert_eq!(
            TransactionStatus::from_gateway("deny"),
            Some(TransactionStatus::Failed)
        );
        assert_eq!(TransactionStatus::from_gateway("authorize"), None);
    }

    #[test]
    fn test_paid_is_final_across_attempts() {
        let paid = TransactionStatus::Pending.after_notification("settlement");
        assert_eq!(paid, TransactionStatus::Paid);

        assert_eq!(paid.after_notification("expire"), TransactionStatus::Paid);
        assert_eq!(paid.after_notification("pending"), TransactionStatus::Paid);
        assert_eq!(paid.after_notification("deny"), TransactionStatus::Paid);
    }

    #[test]
    fn test_unpaid_transaction_follows_notifications() {
        let failed = TransactionStatus::Pending.after_notification("deny");
        assert_eq!(failed, TransactionStatus::Failed);
        assert_eq!(failed.after_notification("authorize"), TransactionStatus::Failed);
        assert_eq!(failed.after_notification("settlement"), TransactionStatus::Paid);
    }

    #[test]
    fn test_attach_customer_keeps_snapshot_on_miss() {
        let tx = Transaction::open(customer(), vec![(service("Wash", 1), 1)], String::new()).unwrap();
        let snapshot = tx.customer.clone();

        let tx = tx.attach_customer(None);
        assert_eq!(tx.customer, snapshot);
    }
}
