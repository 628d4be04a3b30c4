//! Handler replies: ready values or pending futures, both answered exactly once.

// self
use crate::_prelude::*;

/// Boxed future that resolves to a handler's response.
pub type ReplyFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + 'static + Send>>;

/// What a handler produced for one message.
pub enum Reply {
	/// The response is already known.
	Ready(Result<Value, HandlerError>),
	/// The response is still being computed.
	Pending(ReplyFuture),
}
impl Reply {
	/// Wraps a ready response.
	pub fn ready(value: Value) -> Self {
		Self::Ready(Ok(value))
	}

	/// Wraps a ready failure.
	pub fn failed(error: impl Into<HandlerError>) -> Self {
		Self::Ready(Err(error.into()))
	}

	/// Wraps a pending response.
	pub fn pending<Fut>(fut: Fut) -> Self
	where
		Fut: 'static + Future<Output = Result<Value, HandlerError>> + Send,
	{
		Self::Pending(Box::pin(fut))
	}

	/// Returns `true` if the response is already known.
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready(_))
	}

	/// Converts the reply into a future; ready values resolve on first poll.
	pub fn into_future(self) -> ReplyFuture {
		match self {
			Self::Ready(result) => Box::pin(std::future::ready(result)),
			Self::Pending(fut) => fut,
		}
	}
}
impl Debug for Reply {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Ready(result) => f.debug_tuple("Reply::Ready").field(result).finish(),
			Self::Pending(_) => f.write_str("Reply::Pending(..)"),
		}
	}
}

/// Failure reported by a message handler; forwarded to the sender as a rejection.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct HandlerError {
	/// Human-readable failure description.
	pub message: String,
}
impl HandlerError {
	/// Creates a handler error with the provided message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl From<Error> for HandlerError {
	fn from(e: Error) -> Self {
		Self::new(e.to_string())
	}
}
impl From<crate::error::CodecError> for HandlerError {
	fn from(e: crate::error::CodecError) -> Self {
		Self::new(e.to_string())
	}
}
impl From<String> for HandlerError {
	fn from(message: String) -> Self {
		Self { message }
	}
}
impl From<&str> for HandlerError {
	fn from(message: &str) -> Self {
		Self::new(message)
	}
}
