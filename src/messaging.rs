//! Single-dispatch message broker between foreground contexts and the background context.
//!
//! Hosts deliver every inbound message to every attached listener, and more than one listener
//! answering the same message produces duplicate or conflicting responses. [`MessageBroker`]
//! attaches exactly one listener to its [`MessageChannel`] and routes each message by its
//! `type` tag to a single registered handler. Messages without a tag, or with a tag nobody
//! registered, are declined so unrelated listeners can still answer them.

pub mod broker;
pub mod channel;
pub mod envelope;
pub mod reply;

pub use broker::*;
pub use channel::*;
pub use envelope::*;
pub use reply::*;
