//! Crate-level error types shared by the scheduler, the broker, and their host adapters.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Durable wake-up registration failure.
	#[error(transparent)]
	Alarm(#[from] crate::alarm::AlarmError),
	/// External refresh operation failure; the next check retries naturally.
	#[error(transparent)]
	Refresh(#[from] crate::refresh::RefreshError),
	/// Inter-context channel failure.
	#[error(transparent)]
	Channel(#[from] ChannelError),
	/// Message payload could not be encoded or decoded.
	#[error(transparent)]
	Codec(#[from] CodecError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Configuration and validation failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Alarm names must be non-empty so re-registration can replace the previous instance.
	#[error("Alarm name must not be empty.")]
	EmptyAlarmName,
	/// The wake-up period must be strictly positive.
	#[error("Check interval must be positive, got {interval}.")]
	NonPositiveInterval {
		/// Rejected interval.
		interval: Duration,
	},
	/// The wake-up period exceeds the supported maximum.
	#[error("Check interval must not exceed {max}, got {interval}.")]
	IntervalTooLong {
		/// Rejected interval.
		interval: Duration,
		/// Largest accepted interval.
		max: Duration,
	},
	/// The look-ahead buffer cannot be negative.
	#[error("Refresh buffer must not be negative, got {buffer}.")]
	NegativeBuffer {
		/// Rejected buffer.
		buffer: Duration,
	},
	/// The look-ahead buffer exceeds the supported maximum.
	#[error("Refresh buffer must not exceed {max}, got {buffer}.")]
	BufferTooLarge {
		/// Rejected buffer.
		buffer: Duration,
		/// Largest accepted buffer.
		max: Duration,
	},
	/// Message types must be non-empty strings; empty tags are always declined.
	#[error("Message type must not be empty.")]
	EmptyMessageType,
}

/// Inter-context channel failures surfaced to the sending side.
#[derive(Debug, ThisError)]
pub enum ChannelError {
	/// No listener is attached on the receiving side.
	#[error("Could not establish connection: receiving end does not exist.")]
	NoReceiver,
	/// The receiving context went away before replying.
	#[error("Message channel closed before a response was received.")]
	Disconnected,
	/// The matching handler produced an error instead of a value.
	#[error("Message handler for `{message_type}` failed: {message}.")]
	Handler {
		/// Message type whose handler failed.
		message_type: String,
		/// Handler-supplied failure description.
		message: String,
	},
	/// Host transport failure.
	#[error("Message transport failed.")]
	Transport {
		/// Host-specific failure.
		#[source]
		source: BoxError,
	},
}
impl ChannelError {
	/// Wraps a host-specific transport error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Message payload encoding/decoding failures.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// Outbound payload could not be serialized.
	#[error("Message payload for `{message_type}` could not be serialized.")]
	Encode {
		/// Message type being encoded.
		message_type: String,
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// Payload or response did not match the expected shape.
	#[error("Message payload for `{message_type}` does not match the expected shape at `{path}`.")]
	Decode {
		/// Message type being decoded.
		message_type: String,
		/// JSON path of the mismatch.
		path: String,
		/// Underlying deserializer failure.
		#[source]
		source: serde_json::Error,
	},
}
impl CodecError {
	pub(crate) fn decode(
		message_type: &str,
		err: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		let path = err.path().to_string();

		Self::Decode { message_type: message_type.into(), path, source: err.into_inner() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "storage area unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("storage area unavailable"));

		let source = StdError::source(&error).expect("Storage errors should expose their source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn decode_error_keeps_json_path() {
		let value = serde_json::json!({ "count": "three" });
		let err = serde_path_to_error::deserialize::<_, HashMap<String, u32>>(value)
			.expect_err("String values should not decode as integers.");
		let codec = CodecError::decode("COUNT", err);

		assert!(matches!(&codec, CodecError::Decode { path, .. } if path == "count"));
		assert!(codec.to_string().contains("`COUNT`"));
	}
}
