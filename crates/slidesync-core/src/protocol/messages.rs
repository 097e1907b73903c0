//! JSON message types for the preview ⇄ editor sync protocol.
//!
//! Messages are UTF-8 JSON objects, one object per frame, carrying a `"type"`
//! discriminant and the slide index. There are exactly two shapes:
//!
//! ```json
//! {"type":"navigate","slide":5}   preview → editor, on local navigation
//! {"type":"goto","slide":9}       editor → preview, to move the preview
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute produces the discriminant
//! field; `rename_all = "lowercase"` matches the lowercase type names on the
//! wire.
//!
//! # Why two enums for two directions?
//!
//! Each direction consumes exactly one message shape and ignores everything
//! else. Modeling the directions as separate single-variant enums makes an
//! unknown `"type"` a deserialization error — and the dispatcher's rule is
//! that a frame that fails to deserialize is silently ignored, so "unknown
//! type" and "malformed frame" collapse into the same discard path without
//! any extra matching.

use serde::{Deserialize, Serialize};

use crate::domain::SlideIndex;

/// Message sent by the preview agent when the local slide changes.
///
/// Also sent once immediately after a connection opens, to establish the
/// editor's initial view of where the preview is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// The preview is now showing `slide`.
    Navigate {
        /// 1-based index of the slide the preview navigated to.
        slide: SlideIndex,
    },
}

/// Message consumed by the preview agent to navigate the local page.
///
/// Any frame that does not deserialize into this shape — unknown `"type"`,
/// missing or non-integer `slide`, or plain non-JSON text — is discarded by
/// the dispatcher without surfacing an error to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    /// Move the preview to `slide`.
    Goto {
        /// 1-based index of the requested slide. `0` deserializes fine but is
        /// rejected downstream by the navigation planner.
        slide: SlideIndex,
    },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_serializes_to_the_wire_shape() {
        // Arrange
        let msg = OutboundMessage::Navigate { slide: 5 };

        // Act
        let json = serde_json::to_string(&msg).unwrap();

        // Assert: exact wire form the editor side expects
        assert_eq!(json, r#"{"type":"navigate","slide":5}"#);
    }

    #[test]
    fn test_goto_deserializes_from_the_wire_shape() {
        // Arrange: simulate what the editor would send
        let json = r#"{"type":"goto","slide":9}"#;

        // Act
        let msg: InboundMessage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(msg, InboundMessage::Goto { slide: 9 });
    }

    #[test]
    fn test_goto_round_trips() {
        let original = InboundMessage::Goto { slide: 42 };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: InboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        // Peers may attach fields this core does not know about
        let json = r#"{"type":"goto","slide":3,"source":"editor"}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, InboundMessage::Goto { slide: 3 });
    }

    #[test]
    fn test_unknown_type_is_a_deserialization_error() {
        let json = r#"{"type":"highlight","slide":3}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown type must fail to deserialize");
    }

    #[test]
    fn test_navigate_is_not_a_valid_inbound_message() {
        // The directions are distinct: an echoed `navigate` frame must not
        // trigger local navigation.
        let json = r#"{"type":"navigate","slide":3}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_slide_field_is_an_error() {
        let json = r#"{"type":"goto"}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_integer_slide_is_an_error() {
        let json = r#"{"type":"goto","slide":"nine"}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_slide_is_an_error() {
        // SlideIndex is unsigned; a negative value must not sneak through as
        // a wrapped positive one.
        let json = r#"{"type":"goto","slide":-1}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_json_text_is_an_error() {
        let result: Result<InboundMessage, _> = serde_json::from_str("next slide please");
        assert!(result.is_err());
    }
}
