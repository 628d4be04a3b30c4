//! Wire envelope, sender metadata, and the typed message contract.

// self
use crate::{_prelude::*, error::CodecError};

/// `{ "type": ..., "data": ... }` envelope exchanged over the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	/// Routing tag.
	#[serde(rename = "type")]
	pub message_type: String,
	/// Handler-specific payload; `null` when the sender passed nothing.
	#[serde(default)]
	pub data: Value,
}
impl Envelope {
	/// Creates an envelope from an already-encoded payload.
	pub fn new(message_type: impl Into<String>, data: Value) -> Self {
		Self { message_type: message_type.into(), data }
	}

	/// Serializes `data` into a new envelope.
	pub fn encode<T>(message_type: &str, data: &T) -> Result<Self, CodecError>
	where
		T: ?Sized + Serialize,
	{
		let data = serde_json::to_value(data).map_err(|source| CodecError::Encode {
			message_type: message_type.into(),
			source,
		})?;

		Ok(Self::new(message_type, data))
	}

	/// Converts the envelope into the raw JSON value hosts transport.
	pub fn into_value(self) -> Value {
		let mut map = serde_json::Map::with_capacity(2);

		map.insert("type".into(), Value::String(self.message_type));
		map.insert("data".into(), self.data);

		Value::Object(map)
	}

	/// Returns the routing tag of a raw inbound value.
	///
	/// Anything that is not an object with a non-empty string `type` has no tag.
	pub fn type_of(raw: &Value) -> Option<&str> {
		raw.get("type").and_then(Value::as_str).filter(|tag| !tag.is_empty())
	}

	/// Takes the payload out of a raw inbound value, defaulting to `null`.
	pub fn take_data(raw: Value) -> Value {
		match raw {
			Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
			_ => Value::Null,
		}
	}
}

/// Metadata about the context that sent a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
	/// Extension identifier of the sender.
	#[serde(default)]
	pub id: Option<String>,
	/// URL of the page or frame that sent the message.
	#[serde(default)]
	pub url: Option<Url>,
	/// Tab hosting the sender, for content scripts.
	#[serde(default)]
	pub tab_id: Option<i64>,
	/// Frame hosting the sender, for content scripts.
	#[serde(default)]
	pub frame_id: Option<i64>,
}

/// Statically typed message kind.
///
/// Implementors pin a routing tag and a response type so both sides of the channel agree on the
/// payload shapes. See [`MessageBroker::request`](crate::messaging::MessageBroker::request) and
/// [`MessageBroker::handle`](crate::messaging::MessageBroker::handle).
pub trait Message
where
	Self: 'static + Send + Serialize + DeserializeOwned,
{
	/// Routing tag carried in the envelope's `type` field.
	const TYPE: &'static str;

	/// Payload the background handler answers with.
	type Response: 'static + Send + Serialize + DeserializeOwned;
}

/// Decodes a JSON value into `T`, reporting the failing path.
pub(crate) fn decode<T>(message_type: &str, value: Value) -> Result<T, CodecError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|e| CodecError::decode(message_type, e))
}
