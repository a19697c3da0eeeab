//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use laundry_types::{
    CreateTransactionRequest, Customer, CustomerId, CustomerRequest, DomainError,
    LaundryRepository, LineItemRequest, Payment, RepoError, Service, ServiceId, ServiceRequest,
    Transaction, TransactionId, TransactionStatus, UpdateTransactionRequest, User,
};

use crate::types::{
    DbCustomer, DbPayment, DbService, DbTransaction, DbTransactionItem, DbUser, assemble,
    write_error,
};

type ServiceRow = DbService<Uuid>;
type CustomerRow = DbCustomer<Uuid>;
type TransactionRow = DbTransaction<Uuid, DateTime<Utc>>;
type ItemRow = DbTransactionItem<Uuid>;
type PaymentRow = DbPayment<Uuid, DateTime<Utc>>;
type UserRow = DbUser<Uuid, DateTime<Utc>>;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with row-level locking.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection-scoped helpers (usable inside a database transaction)
// ─────────────────────────────────────────────────────────────────────────────

async fn fetch_customer(
    conn: &mut PgConnection,
    id: CustomerId,
) -> Result<Option<Customer>, RepoError> {
    let row: Option<CustomerRow> = sqlx::query_as(
        r#"SELECT id, full_name, email, phone_number FROM customers WHERE id = $1"#,
    )
    .bind(id.into_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    row.map(DbCustomer::into_domain).transpose()
}

async fn fetch_service(
    conn: &mut PgConnection,
    id: ServiceId,
) -> Result<Option<Service>, RepoError> {
    let row: Option<ServiceRow> = sqlx::query_as(
        r#"SELECT id, service_name, description, unit_price, unit FROM services WHERE id = $1"#,
    )
    .bind(id.into_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    row.map(DbService::into_domain).transpose()
}

/// Resolves every requested line against the catalog as it is right now.
async fn resolve_lines(
    conn: &mut PgConnection,
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
    conn: &mut PgConnection,
    id: TransactionId,
) -> Result<Option<Transaction>, RepoError> {
    let id_uuid = id.into_uuid();

    let header: Option<TransactionRow> = sqlx::query_as(
        r#"SELECT id, customer_id, customer_name, customer_email, customer_phone,
                  transaction_date, total_amount, payment_method, status
           FROM transactions WHERE id = $1 FOR UPDATE"#,
    )
    .bind(id_uuid)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    let Some(header) = header else {
        return Ok(None);
    };

    let items: Vec<ItemRow> = sqlx::query_as(
        r#"SELECT id, transaction_id, service_id, service_name, service_description, service_unit,
                  quantity, unit_price, total_price
           FROM transaction_items WHERE transaction_id = $1 ORDER BY position"#,
    )
    .bind(id_uuid)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    header.into_domain(items).map(Some)
}

async fn insert_items(conn: &mut PgConnection, tx: &Transaction) -> Result<(), RepoError> {
    let tx_id = tx.id.into_uuid();

    for (position, item) in tx.items.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO transaction_items
                   (id, transaction_id, position, service_id, service_name, service_description,
                    service_unit, quantity, unit_price, total_price)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(item.id.into_uuid())
        .bind(tx_id)
        .bind(position as i64)
        .bind(item.service_id.into_uuid())
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
impl LaundryRepository for PostgresRepo {
    async fn create_service(&self, req: ServiceRequest) -> Result<Service, RepoError> {
        let service = req.into_service(ServiceId::new())?;

        sqlx::query(
            r#"INSERT INTO services (id, service_name, description, unit_price, unit, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(service.id.into_uuid())
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.unit_price.amount())
        .bind(&service.unit)
        .bind(Utc::now())
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
            r#"UPDATE services SET service_name = $1, description = $2, unit_price = $3, unit = $4 WHERE id = $5"#,
        )
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.unit_price.amount())
        .bind(&service.unit)
        .bind(id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(service)
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM services WHERE id = $1"#)
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_customer(&self, req: CustomerRequest) -> Result<Customer, RepoError> {
        let customer = req.into_customer(CustomerId::new())?;

        sqlx::query(
            r#"INSERT INTO customers (id, full_name, email, phone_number, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(customer.id.into_uuid())
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(Utc::now())
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
            r#"UPDATE customers SET full_name = $1, email = $2, phone_number = $3 WHERE id = $4"#,
        )
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(customer)
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM customers WHERE id = $1"#)
            .bind(id.into_uuid())
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
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(tx.id.into_uuid())
        .bind(tx.customer_id.into_uuid())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(tx.transaction_date)
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
        let id_uuid = id.into_uuid();

        sqlx::query(
            r#"UPDATE transactions
               SET customer_id = $1, customer_name = $2, customer_email = $3, customer_phone = $4,
                   transaction_date = $5, total_amount = $6, payment_method = $7
               WHERE id = $8"#,
        )
        .bind(tx.customer_id.into_uuid())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(tx.transaction_date)
        .bind(tx.total_amount.amount())
        .bind(&tx.payment_method)
        .bind(id_uuid)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(r#"DELETE FROM transaction_items WHERE transaction_id = $1"#)
            .bind(id_uuid)
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
        let id_uuid = id.into_uuid();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        sqlx::query(r#"DELETE FROM transaction_items WHERE transaction_id = $1"#)
            .bind(id_uuid)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let result = sqlx::query(r#"DELETE FROM transactions WHERE id = $1"#)
            .bind(id_uuid)
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
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(payment.transaction_id.into_uuid())
        .bind(&payment.order_id)
        .bind(payment.gross_amount.amount())
        .bind(&payment.snap_url)
        .bind(&payment.status)
        .bind(&payment.payment_method)
        .bind(payment.created_at)
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
               FROM payments WHERE order_id = $1"#,
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

        let row: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT transaction_id FROM payments WHERE order_id = $1 FOR UPDATE"#)
                .bind(order_id)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some((transaction_id,)) = row else {
            return Ok(false);
        };

        sqlx::query(r#"UPDATE payments SET status = $1 WHERE order_id = $2"#)
            .bind(status)
            .bind(order_id)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let current: Option<(String,)> =
            sqlx::query_as(r#"SELECT status FROM transactions WHERE id = $1 FOR UPDATE"#)
                .bind(transaction_id)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if let Some((current,)) = current {
            let current: TransactionStatus = current.parse().map_err(RepoError::Domain)?;
            let next = current.after_notification(status);
            if next != current {
                sqlx::query(r#"UPDATE transactions SET status = $1 WHERE id = $2"#)
                    .bind(next.as_ref())
                    .bind(transaction_id)
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
            r#"INSERT INTO users (id, username, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(user.id.into_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_ref())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "username already exists"))?;

        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1"#,
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
