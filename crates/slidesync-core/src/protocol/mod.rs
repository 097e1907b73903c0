//! Protocol module containing the wire message types and the reconnect
//! backoff policy.

pub mod backoff;
pub mod messages;

pub use backoff::ReconnectBackoff;
pub use messages::{InboundMessage, OutboundMessage};
