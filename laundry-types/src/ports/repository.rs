//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory mocks) implement this trait.

use crate::domain::{
    Customer, CustomerId, Payment, Service, ServiceId, Transaction, TransactionId, User,
};
use crate::dto::{
    CreateTransactionRequest, CustomerRequest, ServiceRequest, UpdateTransactionRequest,
};
use crate::error::RepoError;

/// The repository port for the point of sale.
///
/// Operations that resolve references and then write (creating or updating
/// a transaction, recording a webhook status) MUST run as one unit:
/// either everything is persisted or nothing is.
#[async_trait::async_trait]
pub trait LaundryRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds a service to the catalog.
    async fn create_service(&self, req: ServiceRequest) -> Result<Service, RepoError>;

    /// Gets a service by ID.
    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, RepoError>;

    /// Lists the whole catalog.
    async fn list_services(&self) -> Result<Vec<Service>, RepoError>;

    /// Replaces a service's fields. `RepoError::NotFound` if it does not exist.
    async fn update_service(&self, id: ServiceId, req: ServiceRequest)
    -> Result<Service, RepoError>;

    /// Deletes a service. Returns false if it did not exist.
    async fn delete_service(&self, id: ServiceId) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn create_customer(&self, req: CustomerRequest) -> Result<Customer, RepoError>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepoError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, RepoError>;

    /// `RepoError::NotFound` if the customer does not exist.
    async fn update_customer(
        &self,
        id: CustomerId,
        req: CustomerRequest,
    ) -> Result<Customer, RepoError>;

    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Transactions (resolve-then-write MUST be atomic)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Resolves the customer and every service at current catalog prices,
    /// then persists the priced transaction with its items.
    ///
    /// Unresolvable references fail with `DomainError::CustomerNotFound` or
    /// `DomainError::ServiceNotFound` and nothing is written.
    async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, RepoError>;

    /// Gets a transaction with its items and stored customer snapshot.
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError>;

    /// Lists all transactions, newest first.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepoError>;

    /// Re-prices an existing transaction against the current catalog.
    ///
    /// `DomainError::TransactionNotFound` if `id` does not exist.
    async fn update_transaction(
        &self,
        id: TransactionId,
        req: UpdateTransactionRequest,
    ) -> Result<Transaction, RepoError>;

    /// Deletes a transaction and its items. Returns false if it did not exist.
    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists a new payment. `RepoError::Conflict` if the order id is taken.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    async fn find_payment_by_order_id(&self, order_id: &str)
    -> Result<Option<Payment>, RepoError>;

    async fn list_payments(&self) -> Result<Vec<Payment>, RepoError>;

    /// Sets the status of the payment with `order_id`, and derives the owning
    /// transaction's status from it where the gateway status is conclusive.
    ///
    /// Returns false if no payment has that order id.
    async fn record_payment_status(&self, order_id: &str, status: &str) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists a user. `RepoError::Conflict` if the username is taken.
    async fn create_user(&self, user: &User) -> Result<(), RepoError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn count_users(&self) -> Result<i64, RepoError>;
}
