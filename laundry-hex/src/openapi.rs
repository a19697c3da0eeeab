//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use laundry_types::domain::{
    Customer, CustomerId, Payment, PaymentId, Role, Service, ServiceId, Transaction,
    TransactionId, TransactionItem, TransactionItemId, TransactionStatus,
};
use laundry_types::dto::{
    ConfirmationSummary, CreatePaymentRequest, CreatePaymentResponse, CreateTransactionRequest,
    CredentialsRequest, CustomerRequest, DeletedResponse, LineItemRequest, LoginResponse,
    MessageResponse, RegisterResponse, ServiceRequest, TransactionUpdatedResponse,
    UpdateTransactionRequest, WebhookAck,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Register an account (the first account becomes admin)
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account registered", body = RegisterResponse),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already taken")
    )
)]
async fn register() {}

/// Sign in and receive a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
async fn login() {}

/// Revoke the current bearer token
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    )
)]
async fn logout() {}

/// Add a service to the catalog (admin only)
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    request_body = ServiceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
async fn create_service() {}

/// List the catalog
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of services", body = Vec<Service>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn list_services() {}

/// Get a service by ID
#[utoipa::path(
    get,
    path = "/service-id",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("id" = ServiceId, Query, description = "Service ID (UUID)")
    ),
    responses(
        (status = 200, description = "Service details", body = Service),
        (status = 400, description = "Missing or malformed ID"),
        (status = 404, description = "Service not found")
    )
)]
async fn get_service() {}

/// Update a service (admin only)
#[utoipa::path(
    put,
    path = "/service-id",
    tag = "services",
    request_body = ServiceRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = ServiceId, Query, description = "Service ID (UUID)")
    ),
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Service not found")
    )
)]
async fn update_service() {}

/// Delete a service (admin only)
#[utoipa::path(
    delete,
    path = "/service-id",
    tag = "services",
    security(("bearer_auth" = [])),
    params(
        ("id" = ServiceId, Query, description = "Service ID (UUID)")
    ),
    responses(
        (status = 200, description = "Service deleted", body = DeletedResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Service not found")
    )
)]
async fn delete_service() {}

/// Add a customer
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CustomerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_customer() {}

/// List customers
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of customers", body = Vec<Customer>)
    )
)]
async fn list_customers() {}

/// Get a customer by ID
#[utoipa::path(
    get,
    path = "/customer-id",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(
        ("id" = CustomerId, Query, description = "Customer ID (UUID)")
    ),
    responses(
        (status = 200, description = "Customer details", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
async fn get_customer() {}

/// Update a customer
#[utoipa::path(
    put,
    path = "/customer-id",
    tag = "customers",
    request_body = CustomerRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = CustomerId, Query, description = "Customer ID (UUID)")
    ),
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
async fn update_customer() {}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/customer-id",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(
        ("id" = CustomerId, Query, description = "Customer ID (UUID)")
    ),
    responses(
        (status = 200, description = "Customer deleted", body = DeletedResponse),
        (status = 404, description = "Customer not found")
    )
)]
async fn delete_customer() {}

/// Create a transaction priced from the current catalog
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 400, description = "Empty items, bad quantity, or unknown customer/service")
    )
)]
async fn create_transaction() {}

/// List transactions, newest first
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of transactions", body = Vec<Transaction>)
    )
)]
async fn list_transactions() {}

/// Get a transaction by ID
#[utoipa::path(
    get,
    path = "/transaction-id",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = TransactionId, Query, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction details", body = Transaction),
        (status = 404, description = "Transaction not found")
    )
)]
async fn get_transaction() {}

/// Re-price a transaction against the current catalog
#[utoipa::path(
    put,
    path = "/transaction-id",
    tag = "transactions",
    request_body = UpdateTransactionRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = TransactionId, Query, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction updated", body = TransactionUpdatedResponse),
        (status = 400, description = "Invalid items"),
        (status = 404, description = "Transaction not found")
    )
)]
async fn update_transaction() {}

/// Delete a transaction and its line items
#[utoipa::path(
    delete,
    path = "/transaction-id",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(
        ("id" = TransactionId, Query, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction deleted", body = DeletedResponse),
        (status = 404, description = "Transaction not found")
    )
)]
async fn delete_transaction() {}

/// Open a payment session for a transaction
#[utoipa::path(
    post,
    path = "/create-payment",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment session opened", body = CreatePaymentResponse),
        (status = 400, description = "Zero total or blank order ID"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Order ID already used"),
        (status = 502, description = "Payment gateway error")
    )
)]
async fn create_payment() {}

/// List payments
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of payments", body = Vec<Payment>)
    )
)]
async fn list_payments() {}

/// Get a payment by order ID
#[utoipa::path(
    get,
    path = "/payment-detail",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("order_id" = String, Query, description = "Order ID sent to the gateway")
    ),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
async fn payment_detail() {}

/// Payment gateway notification callback
#[utoipa::path(
    post,
    path = "/webhook/midtrans",
    tag = "payments",
    request_body(content = inline(serde_json::Value), description = "Gateway notification; only order_id and transaction_status are read"),
    responses(
        (status = 200, description = "Notification acknowledged", body = WebhookAck),
        (status = 400, description = "order_id or transaction_status missing")
    )
)]
async fn midtrans_webhook() {}

/// OpenAPI documentation for the laundry point-of-sale API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Laundry Point-of-Sale API",
        version = "1.0.0",
        description = "Customers, service catalog, priced transactions and gateway payments for a laundry.\n\n## Authentication\n\nRegister with `/register` (the first account becomes admin), sign in with `/login`, then include the token in the `Authorization` header:\n\n```\nAuthorization: Bearer <token>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        register,
        login,
        logout,
        create_service,
        list_services,
        get_service,
        update_service,
        delete_service,
        create_customer,
        list_customers,
        get_customer,
        update_customer,
        delete_customer,
        create_transaction,
        list_transactions,
        get_transaction,
        update_transaction,
        delete_transaction,
        create_payment,
        list_payments,
        payment_detail,
        midtrans_webhook,
    ),
    components(
        schemas(
            Service,
            ServiceRequest,
            Customer,
            CustomerRequest,
            Transaction,
            TransactionItem,
            TransactionStatus,
            LineItemRequest,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            TransactionUpdatedResponse,
            Payment,
            CreatePaymentRequest,
            CreatePaymentResponse,
            ConfirmationSummary,
            WebhookAck,
            CredentialsRequest,
            LoginResponse,
            RegisterResponse,
            Role,
            MessageResponse,
            DeletedResponse,
            ServiceId,
            CustomerId,
            TransactionId,
            TransactionItemId,
            PaymentId,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Accounts and bearer tokens"),
        (name = "services", description = "Service catalog (also served under /inventory)"),
        (name = "customers", description = "Customer records"),
        (name = "transactions", description = "Priced laundry orders"),
        (name = "payments", description = "Gateway payment sessions and notifications"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
