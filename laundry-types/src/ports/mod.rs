//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod credentials;
mod gateway;
mod repository;

pub use credentials::{AuthError, Claims, CredentialService};
pub use gateway::{CustomerDetail, GatewayError, GatewaySession, PaymentGateway, SessionRequest};
pub use repository::LaundryRepository;
