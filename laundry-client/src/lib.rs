//! # Laundry Client SDK
//!
//! A typed Rust client for the laundry point-of-sale API.

use laundry_types::{
    CreatePaymentRequest, CreatePaymentResponse, CreateTransactionRequest, CredentialsRequest,
    Customer, CustomerId, CustomerRequest, DeletedResponse, LineItemRequest, LoginResponse,
    MessageResponse, Money, Payment, RegisterResponse, Service, ServiceId, ServiceRequest,
    Transaction, TransactionId, TransactionUpdatedResponse, UpdateTransactionRequest, WebhookAck,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Laundry point-of-sale API client.
pub struct LaundryClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl LaundryClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces the bearer token, e.g. after [`LaundryClient::login`].
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // Accounts

    /// Registers an account. The first account on a fresh server is admin.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        self.send(Method::POST, "/register", &[], Some(&credentials(username, password)))
            .await
    }

    /// Signs in and returns the token and role. The client does not keep the token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.send(Method::POST, "/login", &[], Some(&credentials(username, password)))
            .await
    }

    /// Revokes the current token.
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        self.send(Method::POST, "/logout", &[], None::<&()>).await
    }

    // Services

    pub async fn create_service(
        &self,
        service_name: &str,
        description: &str,
        unit_price: Money,
        unit: &str,
    ) -> Result<Service, ClientError> {
        let req = ServiceRequest {
            service_name: service_name.to_string(),
            description: description.to_string(),
            unit_price,
            unit: unit.to_string(),
        };
        self.send(Method::POST, "/services", &[], Some(&req)).await
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, ClientError> {
        self.send(Method::GET, "/services", &[], None::<&()>).await
    }

    pub async fn get_service(&self, id: ServiceId) -> Result<Service, ClientError> {
        self.send(Method::GET, "/service-id", &[("id", id.to_string())], None::<&()>)
            .await
    }

    pub async fn update_service(
        &self,
        id: ServiceId,
        req: &ServiceRequest,
    ) -> Result<Service, ClientError> {
        self.send(Method::PUT, "/service-id", &[("id", id.to_string())], Some(req))
            .await
    }

    pub async fn delete_service(&self, id: ServiceId) -> Result<DeletedResponse, ClientError> {
        self.send(Method::DELETE, "/service-id", &[("id", id.to_string())], None::<&()>)
            .await
    }

    // Customers

    pub async fn create_customer(&self, req: &CustomerRequest) -> Result<Customer, ClientError> {
        self.send(Method::POST, "/customers", &[], Some(req)).await
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ClientError> {
        self.send(Method::GET, "/customers", &[], None::<&()>).await
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ClientError> {
        self.send(Method::GET, "/customer-id", &[("id", id.to_string())], None::<&()>)
            .await
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        req: &CustomerRequest,
    ) -> Result<Customer, ClientError> {
        self.send(Method::PUT, "/customer-id", &[("id", id.to_string())], Some(req))
            .await
    }

    pub async fn delete_customer(&self, id: CustomerId) -> Result<DeletedResponse, ClientError> {
        self.send(Method::DELETE, "/customer-id", &[("id", id.to_string())], None::<&()>)
            .await
    }

    // Transactions

    /// Creates a transaction priced by the server from its current catalog.
    pub async fn create_transaction(
        &self,
        customer_id: CustomerId,
        items: Vec<LineItemRequest>,
        payment_method: Option<String>,
    ) -> Result<Transaction, ClientError> {
        let req = CreateTransactionRequest {
            customer_id,
            items,
            payment_method,
        };
        self.send(Method::POST, "/transactions", &[], Some(&req)).await
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.send(Method::GET, "/transactions", &[], None::<&()>).await
    }

    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, ClientError> {
        self.send(Method::GET, "/transaction-id", &[("id", id.to_string())], None::<&()>)
            .await
    }

    pub async fn update_transaction(
        &self,
        id: TransactionId,
        req: &UpdateTransactionRequest,
    ) -> Result<TransactionUpdatedResponse, ClientError> {
        self.send(Method::PUT, "/transaction-id", &[("id", id.to_string())], Some(req))
            .await
    }

    pub async fn delete_transaction(
        &self,
        id: TransactionId,
    ) -> Result<DeletedResponse, ClientError> {
        self.send(
            Method::DELETE,
            "/transaction-id",
            &[("id", id.to_string())],
            None::<&()>,
        )
        .await
    }

    // Payments

    /// Opens a gateway payment session for a transaction.
    pub async fn create_payment(
        &self,
        transaction_id: TransactionId,
        order_id: Option<String>,
    ) -> Result<CreatePaymentResponse, ClientError> {
        let req = CreatePaymentRequest {
            transaction_id,
            order_id,
            payment_method: None,
        };
        self.send(Method::POST, "/create-payment", &[], Some(&req))
            .await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, ClientError> {
        self.send(Method::GET, "/payments", &[], None::<&()>).await
    }

    pub async fn get_payment(&self, order_id: &str) -> Result<Payment, ClientError> {
        self.send(
            Method::GET,
            "/payment-detail",
            &[("order_id", order_id.to_string())],
            None::<&()>,
        )
        .await
    }

    /// Delivers a gateway notification, as the payment gateway would.
    pub async fn send_notification(
        &self,
        payload: &serde_json::Value,
    ) -> Result<WebhookAck, ClientError> {
        self.send(Method::POST, "/webhook/midtrans", &[], Some(payload))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self.request(method, path);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn credentials(username: &str, password: &str) -> CredentialsRequest {
    CredentialsRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LaundryClient::new("http://localhost:8082");
        assert_eq!(client.base_url, "http://localhost:8082");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = LaundryClient::new("http://localhost:8082/");
        assert_eq!(client.base_url, "http://localhost:8082");
    }

    #[test]
    fn test_client_with_token() {
        let mut client = LaundryClient::new("http://localhost:8082").with_token("first");
        assert_eq!(client.token.as_deref(), Some("first"));

        client.set_token("second");
        assert_eq!(client.token.as_deref(), Some("second"));
    }

    #[test]
    fn test_bearer_header_is_attached() {
        let client = LaundryClient::new("http://localhost:8082").with_token("abc");
        let req = client.request(Method::GET, "/payments").build().unwrap();

        assert_eq!(req.url().as_str(), "http://localhost:8082/payments");
        assert_eq!(req.headers()["authorization"], "Bearer abc");
    }
}
