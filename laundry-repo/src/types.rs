//! Shared database row types for SQLite and PostgreSQL.
//!
//! Rows are generic over how the backend stores identifiers (`Uuid` in
//! PostgreSQL, `TEXT` in SQLite) and timestamps (`TIMESTAMPTZ` vs RFC 3339
//! `TEXT`), so both adapters share one set of domain conversions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use laundry_types::{
    Customer, CustomerId, Money, Payment, PaymentId, RepoError, Role, Service, ServiceId,
    Transaction, TransactionId, TransactionItem, TransactionItemId, TransactionStatus, User,
    UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Column decoding
// ─────────────────────────────────────────────────────────────────────────────

/// A stored identifier column.
pub trait DbUuid {
    fn into_uuid(self) -> Result<Uuid, RepoError>;
}

impl DbUuid for Uuid {
    fn into_uuid(self) -> Result<Uuid, RepoError> {
        Ok(self)
    }
}

impl DbUuid for String {
    fn into_uuid(self) -> Result<Uuid, RepoError> {
        Uuid::parse_str(&self).map_err(|e| RepoError::Database(e.to_string()))
    }
}

/// A stored timestamp column.
pub trait DbTimestamp {
    fn into_utc(self) -> Result<DateTime<Utc>, RepoError>;
}

impl DbTimestamp for DateTime<Utc> {
    fn into_utc(self) -> Result<DateTime<Utc>, RepoError> {
        Ok(self)
    }
}

impl DbTimestamp for String {
    fn into_utc(self) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(&self)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

fn money(amount: i64) -> Result<Money, RepoError> {
    Money::new(amount).map_err(RepoError::Domain)
}

/// Maps a failed write, turning unique-constraint violations into `Conflict`.
pub fn write_error(err: sqlx::Error, conflict: &str) -> RepoError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => RepoError::Conflict(conflict.to_string()),
        _ => RepoError::Database(err.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Service row from database.
#[derive(FromRow)]
pub struct DbService<I> {
    pub id: I,
    pub service_name: String,
    pub description: String,
    pub unit_price: i64,
    pub unit: String,
}

impl<I: DbUuid> DbService<I> {
    pub fn into_domain(self) -> Result<Service, RepoError> {
        Ok(Service::from_parts(
            ServiceId::from_uuid(self.id.into_uuid()?),
            self.service_name,
            self.description,
            money(self.unit_price)?,
            self.unit,
        ))
    }
}

/// Customer row from database.
#[derive(FromRow)]
pub struct DbCustomer<I> {
    pub id: I,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
}

impl<I: DbUuid> DbCustomer<I> {
    pub fn into_domain(self) -> Result<Customer, RepoError> {
        Ok(Customer::from_parts(
            CustomerId::from_uuid(self.id.into_uuid()?),
            self.full_name,
            self.email,
            self.phone_number,
        ))
    }
}

/// Transaction header row, including the stored customer copy.
#[derive(FromRow)]
pub struct DbTransaction<I, T> {
    pub id: I,
    pub customer_id: I,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub transaction_date: T,
    pub total_amount: i64,
    pub payment_method: String,
    pub status: String,
}

/// Line item row, including the stored service copy.
#[derive(FromRow)]
pub struct DbTransactionItem<I> {
    pub id: I,
    pub transaction_id: I,
    pub service_id: I,
    pub service_name: String,
    pub service_description: String,
    pub service_unit: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total_price: i64,
}

impl<I: DbUuid> DbTransactionItem<I> {
    pub fn into_domain(self) -> Result<TransactionItem, RepoError> {
        let service_id = ServiceId::from_uuid(self.service_id.into_uuid()?);
        let unit_price = money(self.unit_price)?;

        Ok(TransactionItem {
            id: TransactionItemId::from_uuid(self.id.into_uuid()?),
            service_id,
            service: Service::from_parts(
                service_id,
                self.service_name,
                self.service_description,
                unit_price,
                self.service_unit,
            ),
            quantity: self.quantity,
            unit_price,
            total_price: money(self.total_price)?,
        })
    }
}

impl<I: DbUuid, T: DbTimestamp> DbTransaction<I, T> {
    /// Convert database rows to a domain Transaction; `items` must already be
    /// in position order.
    pub fn into_domain(
        self,
        items: Vec<DbTransactionItem<I>>,
    ) -> Result<Transaction, RepoError> {
        let customer_id = CustomerId::from_uuid(self.customer_id.into_uuid()?);
        let customer = Customer::from_parts(
            customer_id,
            self.customer_name,
            self.customer_email,
            self.customer_phone,
        );
        let items = items
            .into_iter()
            .map(DbTransactionItem::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        let status: TransactionStatus = self.status.parse().map_err(RepoError::Domain)?;

        Ok(Transaction::from_parts(
            TransactionId::from_uuid(self.id.into_uuid()?),
            customer_id,
            Some(customer),
            self.transaction_date.into_utc()?,
            items,
            money(self.total_amount)?,
            self.payment_method,
            status,
        ))
    }
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment<I, T> {
    pub id: I,
    pub transaction_id: I,
    pub order_id: String,
    pub gross_amount: i64,
    pub snap_url: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub created_at: T,
}

impl<I: DbUuid, T: DbTimestamp> DbPayment<I, T> {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        Ok(Payment {
            id: PaymentId::from_uuid(self.id.into_uuid()?),
            transaction_id: TransactionId::from_uuid(self.transaction_id.into_uuid()?),
            order_id: self.order_id,
            gross_amount: money(self.gross_amount)?,
            snap_url: self.snap_url,
            status: self.status,
            created_at: self.created_at.into_utc()?,
            payment_method: self.payment_method,
        })
    }
}

/// User row from database.
#[derive(FromRow)]
pub struct DbUser<I, T> {
    pub id: I,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: T,
}

impl<I: DbUuid, T: DbTimestamp> DbUser<I, T> {
    pub fn into_domain(self) -> Result<User, RepoError> {
        let role: Role = self.role.parse().map_err(RepoError::Database)?;

        Ok(User {
            id: UserId::from_uuid(self.id.into_uuid()?),
            username: self.username,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at.into_utc()?,
        })
    }
}

/// Groups item rows (ordered by transaction, then position) under their
/// transaction headers, preserving header order.
pub fn assemble<I, T>(
    headers: Vec<DbTransaction<I, T>>,
    items: Vec<DbTransactionItem<I>>,
) -> Result<Vec<Transaction>, RepoError>
where
    I: DbUuid + Clone + Eq + std::hash::Hash,
    T: DbTimestamp,
{
    let mut by_transaction: std::collections::HashMap<I, Vec<DbTransactionItem<I>>> =
        std::collections::HashMap::new();
    for item in items {
        by_transaction
            .entry(item.transaction_id.clone())
            .or_default()
            .push(item);
    }

    headers
        .into_iter()
        .map(|header| {
            let items = by_transaction.remove(&header.id).unwrap_or_default();
            header.into_domain(items)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_columns_decode() {
        let id = Uuid::new_v4();
        assert_eq!(id.to_string().into_uuid().unwrap(), id);
        assert!("not-a-uuid".to_string().into_uuid().is_err());

        let now = Utc::now();
        let parsed = now.to_rfc3339().into_utc().unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_item_row_rebuilds_service_copy() {
        let row = DbTransactionItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: Uuid::new_v4().to_string(),
            service_id: Uuid::new_v4().to_string(),
            service_name: "Wash".into(),
            service_description: String::new(),
            service_unit: "kg".into(),
            quantity: 3,
            unit_price: 8000,
            total_price: 24000,
        };

        let item = row.into_domain().unwrap();
        assert_eq!(item.service.id, item.service_id);
        assert_eq!(item.service.unit_price, item.unit_price);
        assert_eq!(item.total_price.amount(), 24000);
    }
}
