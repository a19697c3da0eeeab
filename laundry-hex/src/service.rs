//! Point-of-Sale Application Service
//!
//! Orchestrates domain operations through the repository, gateway and
//! credential ports. Contains NO infrastructure logic - pure business
//! orchestration.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use laundry_types::{
    AppError, Claims, ConfirmationSummary, CreatePaymentRequest, CreatePaymentResponse,
    CreateTransactionRequest, CredentialService, CredentialsRequest, Customer, CustomerDetail,
    CustomerId, CustomerRequest, DomainError, LaundryRepository, LineItemRequest, LoginResponse,
    Payment, PaymentGateway, RegisterResponse, RepoError, Role, Service, ServiceId,
    ServiceRequest, SessionRequest, Transaction, TransactionId, TransactionStatus,
    UpdateTransactionRequest, User, WebhookAck, WebhookNotification,
};
use laundry_repo::security::{hash_password, verify_password};

/// Default bound on every store and gateway call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Application service for the laundry point of sale.
///
/// Generic over `R: LaundryRepository` - the adapter is injected at compile time.
/// The gateway and credential collaborators are injected as trait objects.
pub struct PosService<R: LaundryRepository> {
    repo: R,
    gateway: Arc<dyn PaymentGateway>,
    credentials: Arc<dyn CredentialService>,
    deadline: Duration,
}

impl<R: LaundryRepository> PosService<R> {
    /// Creates a new service with the given adapters.
    pub fn new(
        repo: R,
        gateway: Arc<dyn PaymentGateway>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            repo,
            gateway,
            credentials,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Overrides the per-call deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Runs a store call under the deadline.
    async fn store<T>(
        &self,
        call: impl Future<Output = Result<T, RepoError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "Store call timed out");
                Err(AppError::Unavailable("data store did not respond in time".into()))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_service(&self, req: ServiceRequest) -> Result<Service, AppError> {
        self.store(self.repo.create_service(req)).await
    }

    pub async fn get_service(&self, id: ServiceId) -> Result<Service, AppError> {
        self.store(self.repo.get_service(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {}", id)))
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        self.store(self.repo.list_services()).await
    }

    pub async fn update_service(
        &self,
        id: ServiceId,
        req: ServiceRequest,
    ) -> Result<Service, AppError> {
        self.store(self.repo.update_service(id, req))
            .await
            .map_err(|e| not_found_as(e, || format!("Service {}", id)))
    }

    pub async fn delete_service(&self, id: ServiceId) -> Result<(), AppError> {
        if self.store(self.repo.delete_service(id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Service {}", id)))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_customer(&self, req: CustomerRequest) -> Result<Customer, AppError> {
        self.store(self.repo.create_customer(req)).await
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        self.store(self.repo.get_customer(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {}", id)))
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.store(self.repo.list_customers()).await
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        req: CustomerRequest,
    ) -> Result<Customer, AppError> {
        self.store(self.repo.update_customer(id, req))
            .await
            .map_err(|e| not_found_as(e, || format!("Customer {}", id)))
    }

    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), AppError> {
        if self.store(self.repo.delete_customer(id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Customer {}", id)))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transaction Engine
    // ─────────────────────────────────────────────────────────────────────────────

    /// Prices and persists a new transaction at current catalog prices.
    pub async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        validate_lines(&req.items)?;

        let tx = self.store(self.repo.create_transaction(req)).await?;
        tracing::info!(transaction_id = %tx.id, total = %tx.total_amount, "Transaction created");
        Ok(tx)
    }

    /// Gets a transaction with the customer's current details attached.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let tx = self
            .store(self.repo.get_transaction(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))?;

        Ok(self.attach_live_customer(tx).await)
    }

    /// Lists all transactions with current customer details attached.
    ///
    /// The listing and every customer lookup share a single deadline. Each
    /// customer is read once however many transactions reference it.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        let listing = async {
            let transactions = self.repo.list_transactions().await?;

            let mut customers: HashMap<CustomerId, Option<Customer>> = HashMap::new();
            let mut attached = Vec::with_capacity(transactions.len());
            for tx in transactions {
                if !customers.contains_key(&tx.customer_id) {
                    let live = match self.repo.get_customer(tx.customer_id).await {
                        Ok(customer) => customer,
                        Err(e) => {
                            tracing::warn!(
                                customer_id = %tx.customer_id,
                                error = %e,
                                "Customer lookup failed"
                            );
                            None
                        }
                    };
                    customers.insert(tx.customer_id, live);
                }
                let live = customers.get(&tx.customer_id).cloned().flatten();
                attached.push(tx.attach_customer(live));
            }
            Ok::<_, RepoError>(attached)
        };

        self.store(listing).await
    }

    /// Re-prices a transaction against the current catalog.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        req: UpdateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        validate_lines(&req.items)?;

        let tx = self.store(self.repo.update_transaction(id, req)).await?;
        tracing::info!(transaction_id = %tx.id, total = %tx.total_amount, "Transaction re-priced");
        Ok(tx)
    }

    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), AppError> {
        if self.store(self.repo.delete_transaction(id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Transaction {}", id)))
        }
    }

    /// A missing or unreachable customer keeps the stored copy.
    async fn attach_live_customer(&self, tx: Transaction) -> Transaction {
        match self.store(self.repo.get_customer(tx.customer_id)).await {
            Ok(customer) => tx.attach_customer(customer),
            Err(e) => {
                tracing::warn!(transaction_id = %tx.id, error = %e, "Customer lookup failed");
                tx
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Orchestrator
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a gateway session for a stored transaction and records a
    /// pending payment for it.
    pub async fn create_payment(
        &self,
        req: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, AppError> {
        let tx = self
            .store(self.repo.get_transaction(req.transaction_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", req.transaction_id)))?;

        if tx.status == TransactionStatus::Paid {
            return Err(AppError::Conflict(format!(
                "Transaction {} is already paid",
                tx.id
            )));
        }

        if tx.total_amount.is_zero() {
            return Err(AppError::BadRequest(
                "Transaction total must be greater than zero".into(),
            ));
        }

        let order_id = match req.order_id {
            Some(order_id) => {
                let order_id = order_id.trim().to_string();
                if order_id.is_empty() {
                    return Err(AppError::BadRequest("order_id cannot be empty".into()));
                }
                if self
                    .store(self.repo.find_payment_by_order_id(&order_id))
                    .await?
                    .is_some()
                {
                    return Err(AppError::Conflict(format!(
                        "order_id {} already exists",
                        order_id
                    )));
                }
                order_id
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        let customer = match self.store(self.repo.get_customer(tx.customer_id)).await? {
            Some(customer) => Some(customer),
            None => tx.customer.clone(),
        };

        let session = SessionRequest {
            order_id: order_id.clone(),
            gross_amount: tx.total_amount,
            customer: customer.as_ref().map(CustomerDetail::from),
        };
        let session = match tokio::time::timeout(self.deadline, self.gateway.create_session(session))
            .await
        {
            Ok(result) => result?,
            Err(_) => return Err(AppError::Upstream("payment gateway timed out".into())),
        };

        let payment = Payment::pending(&tx, order_id, session.redirect_url, req.payment_method);
        self.store(self.repo.insert_payment(&payment)).await?;

        tracing::info!(
            order_id = %payment.order_id,
            transaction_id = %tx.id,
            gross_amount = %payment.gross_amount,
            "Payment created"
        );

        let first_item = tx.items.first();
        let confirmation_data = ConfirmationSummary {
            full_name: customer
                .as_ref()
                .map(|c| c.full_name.clone())
                .unwrap_or_default(),
            phone_number: customer
                .as_ref()
                .map(|c| c.phone_number.clone())
                .unwrap_or_default(),
            email: customer.map(|c| c.email).unwrap_or_default(),
            service_name: first_item.map(|item| item.service.service_name.clone()),
            quantity: first_item.map(|item| item.quantity),
            total_amount: tx.total_amount,
        };

        Ok(CreatePaymentResponse {
            snap_url: payment.snap_url,
            order_id: payment.order_id,
            confirmation_data,
        })
    }

    /// Applies a gateway notification to the matching payment.
    ///
    /// A notification for an unknown order is acknowledged like any other.
    pub async fn handle_webhook(&self, body: &[u8]) -> Result<WebhookAck, AppError> {
        let payload: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            AppError::from(DomainError::InvalidNotification(format!(
                "body is not JSON: {}",
                e
            )))
        })?;
        let notification = WebhookNotification::from_payload(&payload)?;

        let matched = self
            .store(
                self.repo
                    .record_payment_status(&notification.order_id, &notification.transaction_status),
            )
            .await?;

        if matched {
            tracing::info!(
                order_id = %notification.order_id,
                status = %notification.transaction_status,
                "Payment status updated"
            );
        } else {
            tracing::warn!(
                order_id = %notification.order_id,
                status = %notification.transaction_status,
                "Notification for unknown order"
            );
        }

        Ok(WebhookAck {
            status: "ok".into(),
        })
    }

    pub async fn get_payment(&self, order_id: &str) -> Result<Payment, AppError> {
        self.store(self.repo.find_payment_by_order_id(order_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {}", order_id)))
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, AppError> {
        self.store(self.repo.list_payments()).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Accounts & credentials
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers an account. The very first account becomes admin.
    pub async fn register(&self, req: CredentialsRequest) -> Result<RegisterResponse, AppError> {
        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".into(),
            ));
        }

        let role = if self.store(self.repo.count_users()).await? == 0 {
            Role::Admin
        } else {
            Role::Staff
        };

        let password = req.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

        let user = User::new(username.to_string(), password_hash, role);
        self.store(self.repo.create_user(&user)).await?;

        tracing::info!(username = %user.username, role = %user.role, "User registered");

        Ok(RegisterResponse {
            message: "User registered successfully".into(),
            username: user.username,
            role: user.role,
        })
    }

    /// Checks a username and password and issues a bearer token.
    pub async fn login(&self, req: CredentialsRequest) -> Result<LoginResponse, AppError> {
        let rejected = || AppError::Unauthorized("Invalid username or password".into());

        let user = self
            .store(self.repo.find_user_by_username(req.username.trim()))
            .await?
            .ok_or_else(rejected)?;

        let password = req.password;
        let stored = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("password check task failed: {}", e)))?;
        if !verified {
            return Err(rejected());
        }

        let token = self.credentials.issue(&user.username, user.role)?;
        Ok(LoginResponse {
            token,
            role: user.role,
        })
    }

    /// Revokes a bearer token.
    pub fn logout(&self, token: &str) -> Result<(), AppError> {
        self.credentials.revoke(token).map_err(Into::into)
    }

    /// Verifies a bearer token.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        self.credentials.verify(token).map_err(Into::into)
    }
}

/// Rejects empty orders and non-positive quantities before touching the store.
fn validate_lines(items: &[LineItemRequest]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(DomainError::EmptyTransaction.into());
    }
    if let Some(item) = items.iter().find(|item| item.quantity <= 0) {
        return Err(DomainError::InvalidQuantity {
            service_id: item.service_id,
            quantity: item.quantity,
        }
        .into());
    }
    Ok(())
}

/// Gives a bare `NotFound` a message naming what was missing.
fn not_found_as(err: AppError, what: impl FnOnce() -> String) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::NotFound(what()),
        other => other,
    }
}
