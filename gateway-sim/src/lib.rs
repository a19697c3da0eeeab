//! Simulated hosted-checkout payment gateway.
//!
//! Behaves like a Snap-style gateway closely enough to drive the payment flow
//! end to end without network access or merchant keys:
//!
//! - every session gets a fresh token and a redirect URL built from it
//! - an order id can only open one session, the way a real gateway refuses
//!   `order_id has already been taken`
//! - zero amounts are refused
//! - the gateway can be switched offline to exercise upstream failures
//!
//! # Example
//! ```
//! use gateway_sim::SimulatedGateway;
//!
//! let gateway = SimulatedGateway::new("https://pay.example.test/snap");
//! assert_eq!(gateway.sessions_opened(), 0);
//! ```

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use laundry_types::{GatewayError, GatewaySession, PaymentGateway, SessionRequest};

/// Redirect base of the Midtrans sandbox Snap page.
pub const SANDBOX_REDIRECT_BASE: &str = "https://app.sandbox.midtrans.com/snap/v4/redirection";

// ─────────────────────────────────────────────────────────────────────────────
// Simulated Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// In-process stand-in for the payment gateway.
pub struct SimulatedGateway {
    redirect_base: String,
    orders: Mutex<HashSet<String>>,
    offline: AtomicBool,
}

impl SimulatedGateway {
    /// Creates a gateway whose redirect URLs start with `redirect_base`.
    pub fn new(redirect_base: impl Into<String>) -> Self {
        Self {
            redirect_base: redirect_base.into().trim_end_matches('/').to_string(),
            orders: Mutex::new(HashSet::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Makes every following session request fail as unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or(0)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(SANDBOX_REDIRECT_BASE)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_session(&self, req: SessionRequest) -> Result<GatewaySession, GatewayError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(GatewayError::Unavailable("gateway is offline".into()));
        }

        if req.gross_amount.is_zero() {
            return Err(GatewayError::Rejected(
                "gross_amount must be greater than 0".into(),
            ));
        }

        {
            let mut orders = self
                .orders
                .lock()
                .map_err(|_| GatewayError::Unavailable("gateway state poisoned".into()))?;
            if !orders.insert(req.order_id.clone()) {
                return Err(GatewayError::Rejected(
                    "transaction_details.order_id has already been taken".into(),
                ));
            }
        }

        let token = uuid::Uuid::new_v4().to_string();
        let redirect_url = format!("{}/{}", self.redirect_base, token);

        tracing::debug!(order_id = %req.order_id, amount = %req.gross_amount, "Opened simulated session");

        Ok(GatewaySession {
            token,
            redirect_url,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
