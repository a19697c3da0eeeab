//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;

use laundry_types::{
    CreateTransactionRequest, Customer, CustomerId, CustomerRequest, DomainError,
    LaundryRepository, LineItemRequest, Payment, RepoError, Service, ServiceId, ServiceRequest,
    Transaction, TransactionId, TransactionStatus, UpdateTransactionRequest, User,
};

use crate::types::{
    DbCustomer, DbPayment, DbService, DbTransaction, DbTransactionItem, DbUser, assemble,
    write_error,
};

type ServiceRow = DbService<String>;
type CustomerRow = DbCustomer<String>;
type TransactionRow = DbTransaction<String, String>;
type ItemRow = DbTransactionItem<String>;
type PaymentRow = DbPayment<String, String>;
type UserRow = DbUser<String, String>;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection-scoped helpers (usable inside a database transaction)
// ─────────────────────────────────────────────────────────────────────────────

async fn fetch_customer(
    conn: &mut SqliteConnection,
    id: CustomerId,
) -> Result<Option<Customer>, RepoError> {
    let row: Option<CustomerRow> = sqlx::query_as(
        r#"SELECT id, full_name, email, phone_number FROM customers WHERE id = ?"#,
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    row.map(DbCustomer::into_domain).transpose()
}

async fn fetch_service(
    conn: &mut SqliteConnection,
    id: ServiceId,
) -> Result<Option<Service>, RepoError> {
    let row: Option<ServiceRow> = sqlx::query_as(
        r#"SELECT id, service_name, description, unit_price, unit FROM services WHERE id = ?"#,
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    row.map(DbService::into_domain).transpose()
}

/// Resolves every requested line against the catalog as it is right now.
async fn resolve_lines(
    conn: &mut SqliteConnection,
    items: &[LineItemRequest],
) -> Result<Vec<(Service, i64)>, RepoError> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let service = fetch_service(conn, item.service_id)
            .await?
            .ok_or(DomainError::ServiceNotFound(item.service_id))?;
        lines.push((service, item.quantity));
    }
    Ok(lines)
}

async fn fetch_transaction(
    conn: &mut SqliteConnection,
    id: TransactionId,
) -> Result<Option<Transaction>, RepoError> {
    let id_str = id.to_string();

    let header: Option<TransactionRow> = sqlx::query_as(
        r#"SELECT id, customer_id, customer_name, customer_email, customer_phone,
                  transaction_date, total_amount, payment_method, status
           FROM transactions WHERE id = ?"#,
    )
    .bind(&id_str)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    let Some(header) = header else {
        return Ok(None);
    };

    let items: Vec<ItemRow> = sqlx::query_as(
        r#"SELECT id, transaction_id, service_id, service_name, service_description, service_unit,
                  quantity, unit_price, total_price
           FROM transaction_items WHERE transaction_id = ? ORDER BY position"#,
    )
    .bind(&id_str)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    header.into_domain(items).map(Some)
}

async fn insert_items(conn: &mut SqliteConnection, tx: &Transaction) -> Result<(), RepoError> {
    let tx_id = tx.id.to_string();

    for (position, item) in tx.items.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO transaction_items
                   (id, transaction_id, position, service_id, service_name, service_description,
                    service_unit, quantity, unit_price, total_price)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(item.id.to_string())
        .bind(&tx_id)
        .bind(position as i64)
        .bind(item.service_id.to_string())
        .bind(&item.service.service_name)
        .bind(&item.service.description)
        .bind(&item.service.unit)
        .bind(item.quantity)
        .bind(item.unit_price.amount())
        .bind(item.total_price.amount())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;
    }

    Ok(())
}

fn customer_snapshot(tx: &Transaction) -> (String, String, String) {
    tx.customer
        .as_ref()
        .map(|c| (c.full_name.clone(), c.email.clone(), c.phone_number.clone()))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LaundryRepository for SqliteRepo {
    async fn create_service(&self, req: ServiceRequest) -> Result<Service, RepoError> {
        let service = req.into_service(ServiceId::new())?;

        sqlx::query(
            r#"INSERT INTO services (id, service_name, description, unit_price, unit, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(service.id.to_string())
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.unit_price.amount())
        .bind(&service.unit)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(service)
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        fetch_service(&mut conn, id).await
    }

    async fn list_services(&self) -> Result<Vec<Service>, RepoError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            r#"SELECT id, service_name, description, unit_price, unit FROM services ORDER BY created_at"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbService::into_domain).collect()
    }

    async fn update_service(
        &self,
        id: ServiceId,
        req: ServiceRequest,
    ) -> Result<Service, RepoError> {
        let service = req.into_service(id)?;

        let result = sqlx::query(
            r#"UPDATE services SET service_name = ?, description = ?, unit_price = ?, unit = ? WHERE id = ?"#,
        )
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.unit_price.amount())
        .bind(&service.unit)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(service)
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM services WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_customer(&self, req: CustomerRequest) -> Result<Customer, RepoError> {
        let customer = req.into_customer(CustomerId::new())?;

        sqlx::query(
            r#"INSERT INTO customers (id, full_name, email, phone_number, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(customer.id.to_string())
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(customer)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        fetch_customer(&mut conn, id).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepoError> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"SELECT id, full_name, email, phone_number FROM customers ORDER BY created_at"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCustomer::into_domain).collect()
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        req: CustomerRequest,
    ) -> Result<Customer, RepoError> {
        let customer = req.into_customer(id)?;

        let result = sqlx::query(
            r#"UPDATE customers SET full_name = ?, email = ?, phone_number = ? WHERE id = ?"#,
        )
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(customer)
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM customers WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let customer = fetch_customer(&mut db_tx, req.customer_id)
            .await?
            .ok_or(DomainError::CustomerNotFound(req.customer_id))?;
        let lines = resolve_lines(&mut db_tx, &req.items).await?;

        let tx = Transaction::open(customer, lines, req.payment_method.unwrap_or_default())?;
        let (name, email, phone) = customer_snapshot(&tx);

        sqlx::query(
            r#"INSERT INTO transactions
                   (id, customer_id, customer_name, customer_email, customer_phone,
                    transaction_date, total_amount, payment_method, status)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.customer_id.to_string())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(tx.transaction_date.to_rfc3339())
        .bind(tx.total_amount.amount())
        .bind(&tx.payment_method)
        .bind(tx.status.as_ref())
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        insert_items(&mut db_tx, &tx).await?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(tx)
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        fetch_transaction(&mut conn, id).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepoError> {
        let headers: Vec<TransactionRow> = sqlx::query_as(
            r#"SELECT id, customer_id, customer_name, customer_email, customer_phone,
                      transaction_date, total_amount, payment_method, status
               FROM transactions ORDER BY transaction_date DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let items: Vec<ItemRow> = sqlx::query_as(
            r#"SELECT id, transaction_id, service_id, service_name, service_description, service_unit,
                      quantity, unit_price, total_price
               FROM transaction_items ORDER BY transaction_id, position"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        assemble(headers, items)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        req: UpdateTransactionRequest,
    ) -> Result<Transaction, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let mut tx = fetch_transaction(&mut db_tx, id)
            .await?
            .ok_or(DomainError::TransactionNotFound(id))?;

        if let Some(customer_id) = req.customer_id {
            let customer = fetch_customer(&mut db_tx, customer_id)
                .await?
                .ok_or(DomainError::CustomerNotFound(customer_id))?;
            tx.reassign(customer);
        }

        let lines = resolve_lines(&mut db_tx, &req.items).await?;
        tx.reprice(lines)?;
        if let Some(method) = req.payment_method {
            tx.payment_method = method;
        }

        let (name, email, phone) = customer_snapshot(&tx);
        let id_str = id.to_string();

        sqlx::query(
            r#"UPDATE transactions
               SET customer_id = ?, customer_name = ?, customer_email = ?, customer_phone = ?,
                   transaction_date = ?, total_amount = ?, payment_method = ?
               WHERE id = ?"#,
        )
        .bind(tx.customer_id.to_string())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(tx.transaction_date.to_rfc3339())
        .bind(tx.total_amount.amount())
        .bind(&tx.payment_method)
        .bind(&id_str)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(r#"DELETE FROM transaction_items WHERE transaction_id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        insert_items(&mut db_tx, &tx).await?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(tx)
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, RepoError> {
        let id_str = id.to_string();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        sqlx::query(r#"DELETE FROM transaction_items WHERE transaction_id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let result = sqlx::query(r#"DELETE FROM transactions WHERE id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments
                   (id, transaction_id, order_id, gross_amount, snap_url, status, payment_method, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.transaction_id.to_string())
        .bind(&payment.order_id)
        .bind(payment.gross_amount.amount())
        .bind(&payment.snap_url)
        .bind(&payment.status)
        .bind(&payment.payment_method)
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "order_id already exists"))?;

        Ok(())
    }

    async fn find_payment_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"SELECT id, transaction_id, order_id, gross_amount, snap_url, status, payment_method, created_at
               FROM payments WHERE order_id = ?"#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"SELECT id, transaction_id, order_id, gross_amount, snap_url, status, payment_method, created_at
               FROM payments ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }

    async fn record_payment_status(&self, order_id: &str, status: &str) -> Result<bool, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT transaction_id FROM payments WHERE order_id = ?"#)
                .bind(order_id)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some((transaction_id,)) = row else {
            return Ok(false);
        };

        sqlx::query(r#"UPDATE payments SET status = ? WHERE order_id = ?"#)
            .bind(status)
            .bind(order_id)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let current: Option<(String,)> =
            sqlx::query_as(r#"SELECT status FROM transactions WHERE id = ?"#)
                .bind(&transaction_id)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if let Some((current,)) = current {
            let current: TransactionStatus = current.parse().map_err(RepoError::Domain)?;
            let next = current.after_notification(status);
            if next != current {
                sqlx::query(r#"UPDATE transactions SET status = ? WHERE id = ?"#)
                    .bind(next.as_ref())
                    .bind(&transaction_id)
                    .execute(&mut *db_tx)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(true)
    }

    async fn create_user(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO users (id, username, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_ref())
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "username already exists"))?;

        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn count_users(&self) -> Result<i64, RepoError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.0)
    }
}
