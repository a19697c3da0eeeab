//! Domain models for the laundry point-of-sale service.

pub mod catalog;
pub mod customer;
pub mod id;
pub mod money;
pub mod payment;
pub mod transaction;
pub mod user;
pub mod webhook;

pub use catalog::{Service, ServiceId};
pub use customer::{Customer, CustomerId};
pub use money::Money;
pub use payment::{PAYMENT_PENDING, Payment, PaymentId};
pub use transaction::{
    Transaction, TransactionId, TransactionItem, TransactionItemId, TransactionStatus,
};
pub use user::{Role, User, UserId};
pub use webhook::WebhookNotification;
