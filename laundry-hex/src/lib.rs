//! # Laundry Hex
//!
//! Application service layer and HTTP adapter for the laundry point of sale.
//!
//! ## Architecture
//!
//! - `service/` - Application service (transaction engine, payment orchestrator)
//! - `credentials/` - JWT bearer credentials and the revocation list
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/swagger-ui`
//!
//! The service is generic over `R: LaundryRepository`, allowing
//! different repository implementations to be injected.

pub mod credentials;
pub mod inbound;
pub mod openapi;
pub mod service;


pub use credentials::{JwtCredentials, RevocationList};
pub use service::{DEFAULT_DEADLINE, PosService};
