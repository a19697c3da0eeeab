//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{FromRequest, Query, Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use laundry_types::{
    AppError, Claims, CreatePaymentRequest, CreateTransactionRequest, CredentialsRequest,
    CustomerId, CustomerRequest, DeletedResponse, LaundryRepository, MessageResponse, Role,
    ServiceId, ServiceRequest, TransactionId, TransactionUpdatedResponse,
    UpdateTransactionRequest,
};

use super::auth::extract_bearer;
use crate::PosService;

/// Application state shared across handlers.
pub struct AppState<R: LaundryRepository> {
    pub service: PosService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// JSON request body. Decode failures answer 400 in the API's error shape
/// instead of axum's plain-text 422.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError(AppError::BadRequest(rejection.body_text()))),
        }
    }
}

/// `?id=` selector used by the single-record routes.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    fn parse<T: std::str::FromStr>(&self, what: &str) -> Result<T, AppError> {
        let raw = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Query parameter 'id' is required".into()))?;

        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
    }
}

/// `?order_id=` selector for payment lookups.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub order_id: Option<String>,
}

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".into()))
    }
}

fn deleted(what: &str, id: impl ToString) -> Json<DeletedResponse> {
    Json(DeletedResponse {
        message: format!("{} deleted successfully", what),
        deleted_id: id.to_string(),
    })
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn register<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = state.service.register(req).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn login<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.service.login(req).await?;
    Ok(Json(session))
}

#[tracing::instrument(skip(state, headers))]
pub async fn logout<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = extract_bearer(auth_header)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;

    state.service.logout(token)?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Services (catalog)
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, claims, req), fields(user = %claims.sub, name = %req.service_name))]
pub async fn create_service<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;
    let service = state.service.create_service(req).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[tracing::instrument(skip(state))]
pub async fn list_services<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state.service.list_services().await?;
    Ok(Json(services))
}

#[tracing::instrument(skip(state))]
pub async fn get_service<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ServiceId = query.parse("service")?;
    let service = state.service.get_service(id).await?;
    Ok(Json(service))
}

#[tracing::instrument(skip(state, claims, req), fields(user = %claims.sub))]
pub async fn update_service<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<IdQuery>,
    JsonBody(req): JsonBody<ServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;
    let id: ServiceId = query.parse("service")?;
    let service = state.service.update_service(id, req).await?;
    Ok(Json(service))
}

#[tracing::instrument(skip(state, claims), fields(user = %claims.sub))]
pub async fn delete_service<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&claims)?;
    let id: ServiceId = query.parse("service")?;
    state.service.delete_service(id).await?;
    Ok(deleted("Service", id))
}

// ─────────────────────────────────────────────────────────────────────────────
// Customers
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(name = %req.full_name))]
pub async fn create_customer<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state.service.create_customer(req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[tracing::instrument(skip(state))]
pub async fn list_customers<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = state.service.list_customers().await?;
    Ok(Json(customers))
}

#[tracing::instrument(skip(state))]
pub async fn get_customer<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CustomerId = query.parse("customer")?;
    let customer = state.service.get_customer(id).await?;
    Ok(Json(customer))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_customer<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
    JsonBody(req): JsonBody<CustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CustomerId = query.parse("customer")?;
    let customer = state.service.update_customer(id, req).await?;
    Ok(Json(customer))
}

#[tracing::instrument(skip(state))]
pub async fn delete_customer<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CustomerId = query.parse("customer")?;
    state.service.delete_customer(id).await?;
    Ok(deleted("Customer", id))
}

// ─────────────────────────────────────────────────────────────────────────────
// Transactions
// ─────────────────────────────────────────────────────────────────────────────

/// Create a priced transaction.
#[tracing::instrument(skip(state, req), fields(customer_id = %req.customer_id, lines = req.items.len()))]
pub async fn create_transaction<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state.service.create_transaction(req).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

#[tracing::instrument(skip(state))]
pub async fn list_transactions<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = state.service.list_transactions().await?;
    Ok(Json(transactions))
}

#[tracing::instrument(skip(state))]
pub async fn get_transaction<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TransactionId = query.parse("transaction")?;
    let tx = state.service.get_transaction(id).await?;
    Ok(Json(tx))
}

/// Re-price a transaction against the current catalog.
#[tracing::instrument(skip(state, req), fields(lines = req.items.len()))]
pub async fn update_transaction<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
    JsonBody(req): JsonBody<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TransactionId = query.parse("transaction")?;
    let tx = state.service.update_transaction(id, req).await?;
    Ok(Json(TransactionUpdatedResponse {
        message: "Transaction updated successfully".into(),
        transaction: tx,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn delete_transaction<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TransactionId = query.parse("transaction")?;
    state.service.delete_transaction(id).await?;
    Ok(deleted("Transaction", id))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Open a gateway session for a stored transaction.
#[tracing::instrument(skip(state, req), fields(transaction_id = %req.transaction_id))]
pub async fn create_payment<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.service.create_payment(req).await?;
    Ok(Json(created))
}

#[tracing::instrument(skip(state))]
pub async fn list_payments<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list_payments().await?;
    Ok(Json(payments))
}

#[tracing::instrument(skip(state))]
pub async fn payment_detail<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = query
        .order_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'order_id' is required".into()))?;

    let payment = state.service.get_payment(&order_id).await?;
    Ok(Json(payment))
}

/// Gateway notification callback. The raw body is validated by the service.
#[tracing::instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn midtrans_webhook<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.service.handle_webhook(&body).await?;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_query_requires_value() {
        let query = IdQuery { id: None };
        assert!(matches!(
            query.parse::<ServiceId>("service"),
            Err(AppError::BadRequest(_))
        ));

        let query = IdQuery { id: Some(String::new()) };
        assert!(matches!(
            query.parse::<ServiceId>("service"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_id_query_rejects_malformed_uuid() {
        let query = IdQuery {
            id: Some("not-a-uuid".into()),
        };
        match query.parse::<TransactionId>("transaction") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid transaction ID"),
            _ => panic!("expected BadRequest"),
        }
    }

    #[test]
    fn test_id_query_parses_uuid() {
        let id = CustomerId::new();
        let query = IdQuery {
            id: Some(id.to_string()),
        };
        assert_eq!(query.parse::<CustomerId>("customer").unwrap(), id);
    }

    #[test]
    fn test_staff_is_not_admin() {
        let claims = Claims {
            sub: "kasir".into(),
            role: Role::Staff,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(require_admin(&claims), Err(AppError::Forbidden(_))));

        let claims = Claims {
            role: Role::Admin,
            ..claims
        };
        assert!(require_admin(&claims).is_ok());
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
