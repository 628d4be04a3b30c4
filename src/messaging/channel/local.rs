//! In-process [`MessageChannel`] with browser-like listener semantics.

// self
use crate::{
	_prelude::*,
	error::ChannelError,
	messaging::{
		ChannelFuture, Envelope, MessageChannel, MessageListener, MessageSender, ReplyFuture,
	},
};

/// Channel that delivers messages to listeners attached in the same process.
///
/// Every listener sees every message, in attachment order. The first listener that does not
/// decline answers; replies from later listeners are dropped, like a browser keeping only the
/// first `sendResponse`. A message every listener declines resolves to `None`. Sending with no
/// listener attached fails with [`ChannelError::NoReceiver`].
#[derive(Default)]
pub struct LocalChannel {
	listeners: RwLock<Vec<MessageListener>>,
	sender: Option<MessageSender>,
}
impl LocalChannel {
	/// Creates a channel that stamps every delivery with `sender`.
	pub fn with_sender(sender: MessageSender) -> Self {
		Self { listeners: Default::default(), sender: Some(sender) }
	}

	/// Number of attached listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.read().len()
	}

	/// Delivers a raw inbound value, returning the first reply.
	///
	/// Use this to feed messages that do not follow the envelope shape.
	pub fn deliver(&self, raw: Value) -> Option<ReplyFuture> {
		let listeners = self.listeners.read().clone();
		let mut reply = None;

		for listener in listeners {
			let answer = listener(raw.clone(), self.sender.clone());

			if reply.is_none() {
				reply = answer;
			}
		}

		reply
	}
}
impl MessageChannel for LocalChannel {
	fn send_message(&self, envelope: Envelope) -> ChannelFuture<'_> {
		if self.listener_count() == 0 {
			return Box::pin(async { Err(ChannelError::NoReceiver) });
		}

		let message_type = envelope.message_type.clone();
		let reply = self.deliver(envelope.into_value());

		Box::pin(async move {
			match reply {
				None => Ok(None),
				Some(reply) => reply
					.await
					.map(Some)
					.map_err(|e| ChannelError::Handler { message_type, message: e.message }),
			}
		})
	}

	fn add_listener(&self, listener: MessageListener) {
		self.listeners.write().push(listener);
	}
}
impl Debug for LocalChannel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocalChannel")
			.field("listeners", &self.listener_count())
			.field("sender", &self.sender)
			.finish()
	}
}
