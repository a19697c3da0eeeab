//! Router assembly and the serve loop.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use laundry_types::LaundryRepository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use crate::PosService;
use crate::openapi::ApiDoc;

/// HTTP Server for the laundry point-of-sale API.
pub struct HttpServer<R: LaundryRepository> {
    state: Arc<AppState<R>>,
}

impl<R: LaundryRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: PosService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the router: protected API routes, public docs, and the outer layers.
    pub fn router(&self) -> Router {
        // Reads the global MeterProvider.
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let services = get(handlers::get_service::<R>)
            .put(handlers::update_service::<R>)
            .delete(handlers::delete_service::<R>);
        let service_list =
            post(handlers::create_service::<R>).get(handlers::list_services::<R>);

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/register", post(handlers::register::<R>))
            .route("/login", post(handlers::login::<R>))
            .route("/logout", post(handlers::logout::<R>))
            .route("/services", service_list.clone())
            .route("/service-id", services.clone())
            .route("/inventory", service_list)
            .route("/inventory-id", services)
            .route(
                "/customers",
                post(handlers::create_customer::<R>).get(handlers::list_customers::<R>),
            )
            .route(
                "/customer-id",
                get(handlers::get_customer::<R>)
                    .put(handlers::update_customer::<R>)
                    .delete(handlers::delete_customer::<R>),
            )
            .route(
                "/transactions",
                post(handlers::create_transaction::<R>).get(handlers::list_transactions::<R>),
            )
            .route(
                "/transaction-id",
                get(handlers::get_transaction::<R>)
                    .put(handlers::update_transaction::<R>)
                    .delete(handlers::delete_transaction::<R>),
            )
            .route("/create-payment", post(handlers::create_payment::<R>))
            .route("/payments", get(handlers::list_payments::<R>))
            .route("/payment-detail", get(handlers::payment_detail::<R>))
            .route("/webhook/midtrans", post(handlers::midtrans_webhook::<R>))
            .layer(metrics)
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
            .with_state(self.state.clone());

        api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
