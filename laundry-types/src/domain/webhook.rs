//! Inbound gateway notifications.

use serde_json::Value;

use crate::error::DomainError;

/// The only two fields of a gateway notification this service acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookNotification {
    pub order_id: String,
    pub transaction_status: String,
}

impl WebhookNotification {
    /// Validates an arbitrary notification payload.
    ///
    /// Both `order_id` and `transaction_status` must be present and be JSON
    /// strings. Every other field is ignored.
    pub fn from_payload(payload: &Value) -> Result<Self, DomainError> {
        let order_id = string_field(payload, "order_id")?;
        let transaction_status = string_field(payload, "transaction_status")?;

        Ok(Self {
            order_id,
            transaction_status,
        })
    }
}

fn string_field(payload: &Value, name: &str) -> Result<String, DomainError> {
    payload
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| DomainError::InvalidNotification(format!("{} missing or not a string", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_order_and_status() {
        let payload = json!({
            "order_id": "abc",
            "transaction_status": "settlement",
            "gross_amount": "24000.00",
            "fraud_status": "accept"
        });

        let notification = WebhookNotification::from_payload(&payload).unwrap();
        assert_eq!(notification.order_id, "abc");
        assert_eq!(notification.transaction_status, "settlement");
    }

    #[test]
    fn test_missing_order_id_is_rejected() {
        let payload = json!({ "transaction_status": "settlement" });
        assert!(matches!(
            WebhookNotification::from_payload(&payload),
            Err(DomainError::InvalidNotification(_))
        ));
    }

    #[test]
    fn test_non_string_status_is_rejected() {
        let payload = json!({ "order_id": "abc", "transaction_status": 200 });
        assert!(WebhookNotification::from_payload(&payload).is_err());
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(WebhookNotification::from_payload(&json!(["order_id"])).is_err());
    }
}
