//! Authentication middleware for bearer token validation.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use laundry_types::LaundryRepository;

use super::handlers::AppState;

/// Routes reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/health", "/register", "/login", "/webhook/midtrans"];

/// Route prefixes reachable without a token (API documentation).
const PUBLIC_PREFIXES: &[&str] = &["/swagger-ui", "/api-docs"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Extracts the token from an Authorization header value.
/// Expected format: "Bearer <token>"
pub(crate) fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Authentication middleware that validates bearer tokens.
///
/// On success the verified [`laundry_types::Claims`] are inserted into the
/// request extensions for handlers that check roles.
///
/// Endpoints that bypass authentication:
/// - `/health`, `/register`, `/login`
/// - `/webhook/midtrans` - called by the payment gateway
/// - `/swagger-ui` and `/api-docs` - API documentation
pub async fn auth_middleware<R: LaundryRepository>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let verified = match extract_bearer(auth_header) {
        Some(token) => state.service.authenticate(token),
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    match verified {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_requires_scheme() {
        assert_eq!(extract_bearer(Some("abc.def.ghi")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(None), None);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health"));
        assert!(is_public("/webhook/midtrans"));
        assert!(is_public("/swagger-ui/index.html"));
        assert!(is_public("/api-docs/openapi.json"));
        assert!(!is_public("/transactions"));
        assert!(!is_public("/logout"));
    }
}
