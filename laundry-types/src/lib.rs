//! # Laundry Types
//!
//! Domain types and port traits for the laundry point-of-sale service.
//! This crate has ZERO external IO dependencies - only data structures,
//! pricing rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Service, Customer, Transaction, Payment)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Customer, CustomerId, Money, PAYMENT_PENDING, Payment, PaymentId, Role, Service, ServiceId,
    Transaction, TransactionId, TransactionItem, TransactionItemId, TransactionStatus, User,
    UserId, WebhookNotification,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    AuthError, Claims, CredentialService, CustomerDetail, GatewayError, GatewaySession,
    LaundryRepository, PaymentGateway, SessionRequest,
};
