//! Channel wire protocol.
//!
//! Frames are JSON text tagged by a `type` field:
//!
//! | Direction | Shape |
//! |---|---|
//! | professional → server | `{"type":"location","data":{"latitude":..,"longitude":..}}` |
//! | server → professional | `{"type":"location","data":{..}}` (replay only) |
//! | server → user | `{"type":"professionalLocation","professionalId":7,"data":{..}}` |
//!
//! Inbound frames are decoded once, here, into [`InboundMessage`]; anything
//! else is a single [`RelayError::ProtocolError`].
//!
//! The handshake travels in the upgrade request's query string:
//! `?type=professional&professionalId=7` or `?type=user&userId=3`. A bare
//! `id` parameter is accepted for either role.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Identity, ProfessionalId, Role};
use crate::error::{RelayError, RelayResult};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// A professional's current position.
    Location {
        /// Reported coordinate
        data: Coordinate,
    },
}

/// Frames the server pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Self-echo of a professional's last stored position.
    Location {
        /// Stored coordinate
        data: Coordinate,
    },
    /// A tracked professional's position, sent to customers.
    ProfessionalLocation {
        /// Professional the coordinate belongs to
        #[serde(rename = "professionalId")]
        professional_id: ProfessionalId,
        /// Reported coordinate
        data: Coordinate,
    },
}

/// Decode a text frame from a client.
///
/// # Errors
///
/// Returns a protocol error for non-JSON text, unknown `type` tags, and
/// missing or non-numeric coordinate fields.
pub fn decode_inbound(text: &str) -> RelayResult<InboundMessage> {
    serde_json::from_str(text)
        .map_err(|e| RelayError::protocol("Malformed inbound frame", Some(Box::new(e))))
}

/// Encode a server frame as JSON text.
///
/// # Errors
///
/// Returns a protocol error if serialization fails.
pub fn encode_outbound(message: &OutboundMessage) -> RelayResult<String> {
    serde_json::to_string(message)
        .map_err(|e| RelayError::protocol("Failed to encode outbound frame", Some(Box::new(e))))
}

/// Resolve the identity a connection request claims.
///
/// # Errors
///
/// Returns a handshake error if the role is missing or unknown, or if the id
/// for that role is missing or not an integer.
pub fn parse_handshake(params: &HashMap<String, String>) -> RelayResult<Identity> {
    let role_param = params
        .get("type")
        .or_else(|| params.get("kind"))
        .ok_or_else(|| RelayError::handshake("missing 'type' parameter", None))?;

    let role = role_param
        .parse::<Role>()
        .map_err(|e| RelayError::handshake(e, None))?;

    let id_key = match role {
        Role::Professional => "professionalId",
        Role::User => "userId",
    };

    let raw_id = params
        .get(id_key)
        .or_else(|| params.get("id"))
        .ok_or_else(|| RelayError::handshake(format!("missing '{id_key}' parameter"), None))?;

    let id = raw_id.trim().parse::<i64>().map_err(|e| {
        RelayError::handshake(format!("'{raw_id}' is not a numeric id"), Some(Box::new(e)))
    })?;

    Ok(match role {
        Role::Professional => Identity::Professional(id),
        Role::User => Identity::Customer(id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_decode_location_frame() {
        let msg = decode_inbound(r#"{"type":"location","data":{"latitude":1.0,"longitude":2.0}}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Location {
                data: Coordinate::new(1.0, 2.0)
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        for frame in [
            "not json",
            r#"{"type":"location"}"#,
            r#"{"type":"location","data":{"latitude":"north","longitude":2.0}}"#,
            r#"{"type":"location","data":{"latitude":1.0}}"#,
            r#"{"type":"teleport","data":{"latitude":1.0,"longitude":2.0}}"#,
            r#"{"data":{"latitude":1.0,"longitude":2.0}}"#,
        ] {
            let err = decode_inbound(frame).unwrap_err();
            assert!(
                matches!(err, RelayError::ProtocolError { .. }),
                "expected protocol error for {frame}"
            );
        }
    }

    #[test]
    fn test_professional_location_wire_shape() {
        let msg = OutboundMessage::ProfessionalLocation {
            professional_id: 7,
            data: Coordinate::new(1.0, 2.0),
        };
        let value: serde_json::Value =
            serde_json::from_str(&encode_outbound(&msg).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "professionalLocation",
                "professionalId": 7,
                "data": {"latitude": 1.0, "longitude": 2.0}
            })
        );
    }

    #[test]
    fn test_location_echo_wire_shape() {
        let msg = OutboundMessage::Location {
            data: Coordinate::new(40.71, -74.0),
        };
        let value: serde_json::Value =
            serde_json::from_str(&encode_outbound(&msg).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "location", "data": {"latitude": 40.71, "longitude": -74.0}})
        );
    }

    #[test]
    fn test_handshake_professional() {
        let identity =
            parse_handshake(&params(&[("type", "professional"), ("professionalId", "7")])).unwrap();
        assert_eq!(identity, Identity::Professional(7));
    }

    #[test]
    fn test_handshake_user_and_generic_id() {
        let identity = parse_handshake(&params(&[("type", "user"), ("userId", "3")])).unwrap();
        assert_eq!(identity, Identity::Customer(3));

        let identity = parse_handshake(&params(&[("kind", "user"), ("id", "9")])).unwrap();
        assert_eq!(identity, Identity::Customer(9));
    }

    #[test]
    fn test_handshake_rejections() {
        let cases = [
            params(&[]),
            params(&[("type", "admin"), ("id", "1")]),
            params(&[("type", "professional")]),
            params(&[("type", "professional"), ("userId", "7")]),
            params(&[("type", "user"), ("userId", "abc")]),
        ];
        for case in &cases {
            assert!(
                matches!(parse_handshake(case), Err(RelayError::HandshakeError { .. })),
                "expected rejection for {case:?}"
            );
        }
    }
}
