//! Inter-context channel contract.

pub mod local;

pub use local::LocalChannel;

// self
use crate::{
	_prelude::*,
	error::ChannelError,
	messaging::{Envelope, MessageSender, ReplyFuture},
};

/// Boxed future returned by [`MessageChannel::send_message`].
///
/// Resolves to `None` when every listener declined the message.
pub type ChannelFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Option<Value>, ChannelError>> + 'a + Send>>;

/// Host-facing listener: answers with a reply future, or `None` to decline the message.
pub type MessageListener =
	Arc<dyn Fn(Value, Option<MessageSender>) -> Option<ReplyFuture> + Send + Sync>;

/// Host channel between foreground contexts and the background context.
pub trait MessageChannel
where
	Self: Send + Sync,
{
	/// Sends an envelope to the other side and resolves to its response, or `None` if nobody
	/// answered it.
	fn send_message(&self, envelope: Envelope) -> ChannelFuture<'_>;

	/// Attaches a listener for inbound messages.
	fn add_listener(&self, listener: MessageListener);
}
