//! Inbound request decoding
//!
//! Requests arrive as externally tagged JSON objects:
//!
//! ```text
//! {"order":  {"username": ..., "contract": ..., "quantity": ..., "price": ..., "side": ...}}
//! {"cancel": {"order_id": ...}}
//! ```
//!
//! Malformed input is rejected here, at the boundary, never deep inside
//! matching logic. Unknown extra fields are tolerated.

use serde::Deserialize;
use types::prelude::*;

/// A decoded inbound request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Request {
    #[serde(rename = "order")]
    Order(SubmitRequest),
    #[serde(rename = "cancel")]
    Cancel(CancelRequest),
}

/// Submission of a new limit order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitRequest {
    pub username: String,
    pub contract: ContractId,
    pub quantity: Quantity,
    pub price: Price,
    pub side: Side,
}

/// Cancellation of a resting order
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CancelRequest {
    pub order_id: OrderId,
}

/// Decode and validate one raw inbound message
pub fn decode(raw: &str) -> Result<Request, EngineError> {
    let request: Request =
        serde_json::from_str(raw).map_err(|err| EngineError::MalformedRequest(err.to_string()))?;

    if let Request::Order(submit) = &request {
        if submit.quantity.is_zero() {
            return Err(EngineError::MalformedRequest(
                "quantity must be positive".into(),
            ));
        }
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_submit() {
        let raw = r#"{"order": {"username": "alice", "contract": 1,
                      "quantity": 10, "price": 100, "side": "BUY"}}"#;
        let request = decode(raw).unwrap();
        assert_eq!(
            request,
            Request::Order(SubmitRequest {
                username: "alice".into(),
                contract: ContractId::new(1),
                quantity: Quantity::new(10),
                price: Price::new(100),
                side: Side::BUY,
            })
        );
    }

    #[test]
    fn test_decode_cancel() {
        let request = decode(r#"{"cancel": {"order_id": 42}}"#).unwrap();
        assert_eq!(
            request,
            Request::Cancel(CancelRequest {
                order_id: OrderId::new(42)
            })
        );
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let raw = r#"{"order": {"username": "alice", "contract": 1, "quantity": 1,
                      "price": 5, "side": "SELL", "session": "xyz"}}"#;
        assert!(decode(raw).is_ok());
    }

    #[test]
    fn test_undecodable_is_malformed() {
        assert!(matches!(
            decode("not json at all"),
            Err(EngineError::MalformedRequest(_))
        ));
        assert!(matches!(
            decode(r#"{"unknown": {}}"#),
            Err(EngineError::MalformedRequest(_))
        ));
        assert!(matches!(
            decode(r#"{"order": {"username": "a"}}"#),
            Err(EngineError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_zero_quantity_rejected_at_boundary() {
        let raw = r#"{"order": {"username": "alice", "contract": 1,
                      "quantity": 0, "price": 100, "side": "BUY"}}"#;
        assert!(matches!(
            decode(raw),
            Err(EngineError::MalformedRequest(msg)) if msg.contains("positive")
        ));
    }

    #[test]
    fn test_negative_quantity_rejected_at_boundary() {
        let raw = r#"{"order": {"username": "alice", "contract": 1,
                      "quantity": -5, "price": 100, "side": "BUY"}}"#;
        assert!(matches!(decode(raw), Err(EngineError::MalformedRequest(_))));
    }

    #[test]
    fn test_invalid_side_rejected() {
        let raw = r#"{"order": {"username": "alice", "contract": 1,
                      "quantity": 5, "price": 100, "side": "HOLD"}}"#;
        assert!(matches!(decode(raw), Err(EngineError::MalformedRequest(_))));
    }
}
