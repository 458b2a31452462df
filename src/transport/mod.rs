//! Messaging transport boundary.
//!
//! The bot only needs to send text, check that an address exists and
//! receive inbound messages. Session handling belongs to the transport.

mod console;

pub use console::{parse_console_line, ConsoleTransport};

use crate::error::BotResult;
use async_trait::async_trait;

/// Outbound side of a messaging transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message to an address
    async fn send_message(&self, address: &str, text: &str) -> BotResult<()>;

    /// Check whether the address can receive messages
    async fn is_registered_address(&self, address: &str) -> BotResult<bool>;
}

/// A message received from a contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw sender address as reported by the transport
    pub from: String,
    pub body: String,
}

impl InboundMessage {
    pub fn new(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
        }
    }

    /// Sender address without any transport suffix
    pub fn contact_key(&self) -> &str {
        contact_key(&self.from)
    }
}

/// Lifecycle and message events delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Ready,
    Message(InboundMessage),
    AuthFailure(String),
    Disconnected(String),
}

/// Strip a transport suffix such as `@c.us` from an address
pub fn contact_key(address: &str) -> &str {
    address.split('@').next().unwrap_or(address)
}
