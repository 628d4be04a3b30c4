//! Type-keyed handler registry behind a single channel listener.

// std
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	error::{CodecError, ConfigError},
	messaging::{
		Envelope, HandlerError, Message, MessageChannel, MessageSender, Reply, ReplyFuture,
		envelope::decode,
	},
	obs::{TaskKind, TaskSpan},
};

type ErasedHandler = Arc<dyn Fn(Value, Option<MessageSender>) -> Reply + Send + Sync>;

/// Counters describing dispatch activity since the broker was created.
#[derive(Debug, Default)]
pub struct BrokerMetrics {
	handled: AtomicU64,
	declined: AtomicU64,
}
impl BrokerMetrics {
	/// Returns the number of messages routed to a handler.
	pub fn handled(&self) -> u64 {
		self.handled.load(Ordering::Relaxed)
	}

	/// Returns the number of messages left for other listeners.
	pub fn declined(&self) -> u64 {
		self.declined.load(Ordering::Relaxed)
	}
}

/// Routes inbound messages to exactly one handler per `type`.
///
/// The first registration attaches the broker's only listener to the channel; later
/// registrations just update the table, and the last registration for a `type` wins. Clones
/// share the table and the listener, so keep one broker (or its clones) per channel.
pub struct MessageBroker<C>
where
	C: ?Sized + MessageChannel,
{
	/// Channel the broker sends through and listens on.
	pub channel: Arc<C>,
	registry: Arc<HandlerRegistry>,
	listener_attached: Arc<AtomicBool>,
}
impl<C> MessageBroker<C>
where
	C: 'static + ?Sized + MessageChannel,
{
	/// Creates a broker over `channel`. No listener is attached until a handler is registered.
	pub fn new(channel: Arc<C>) -> Self {
		Self { channel, registry: Default::default(), listener_attached: Default::default() }
	}

	/// Sends `data` under `message_type` and decodes the response.
	///
	/// Resolves to `None` when no listener handles the type; that is not an error.
	pub async fn send<T, R>(&self, message_type: &str, data: &T) -> Result<Option<R>>
	where
		T: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let envelope = Envelope::encode(message_type, data)?;
		let Some(response) = self.channel.send_message(envelope).await? else {
			return Ok(None);
		};

		Ok(Some(decode(message_type, response)?))
	}

	/// Sends a typed message and decodes its typed response, `None` if it went unhandled.
	pub async fn request<M>(&self, message: &M) -> Result<Option<M::Response>>
	where
		M: Message,
	{
		self.send(M::TYPE, message).await
	}

	/// Registers an untyped handler that produces a [`Reply`] directly.
	pub fn on_raw<F>(&self, message_type: &str, handler: F) -> Result<()>
	where
		F: 'static + Fn(Value, Option<MessageSender>) -> Reply + Send + Sync,
	{
		if message_type.is_empty() {
			return Err(ConfigError::EmptyMessageType.into());
		}

		let previous =
			self.registry.handlers.write().insert(message_type.to_owned(), Arc::new(handler));

		if previous.is_some() {
			TaskSpan::new(TaskKind::Dispatch, "register")
				.debug("Replaced message handler.", &message_type);
		}

		self.ensure_listener();

		Ok(())
	}

	/// Registers a handler whose response is ready as soon as it returns.
	pub fn on<T, R, F>(&self, message_type: &str, handler: F) -> Result<()>
	where
		T: DeserializeOwned,
		R: Serialize,
		F: 'static + Fn(T, Option<MessageSender>) -> R + Send + Sync,
	{
		let tag: Arc<str> = message_type.into();

		self.on_raw(message_type, move |data, sender| {
			let response = decode::<T>(&tag, data)
				.and_then(|data| encode_response(&tag, &handler(data, sender)));

			match response {
				Ok(value) => Reply::ready(value),
				Err(e) => Reply::failed(e),
			}
		})
	}

	/// Registers a handler that answers asynchronously.
	///
	/// The returned future is handed to the host as is, so a slow handler never delays dispatch
	/// of other messages.
	pub fn on_async<T, R, F, Fut>(&self, message_type: &str, handler: F) -> Result<()>
	where
		T: DeserializeOwned,
		R: Serialize,
		F: 'static + Fn(T, Option<MessageSender>) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<R, HandlerError>> + Send,
	{
		let tag: Arc<str> = message_type.into();

		self.on_raw(message_type, move |data, sender| {
			let data = match decode::<T>(&tag, data) {
				Ok(data) => data,
				Err(e) => return Reply::failed(e),
			};
			let response = handler(data, sender);
			let tag = tag.clone();

			Reply::pending(async move {
				let response = response.await?;

				Ok::<_, HandlerError>(encode_response(&tag, &response)?)
			})
		})
	}

	/// Registers the handler for a typed message.
	pub fn handle<M, F, Fut>(&self, handler: F) -> Result<()>
	where
		M: Message,
		F: 'static + Fn(M, Option<MessageSender>) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<M::Response, HandlerError>> + Send,
	{
		self.on_async(M::TYPE, handler)
	}

	/// Removes the handler for `message_type`. Returns `false` if none was registered.
	///
	/// The channel listener stays attached and declines the type from now on.
	pub fn off(&self, message_type: &str) -> bool {
		self.registry.handlers.write().remove(message_type).is_some()
	}

	/// Returns `true` if a handler is registered for `message_type`.
	pub fn has_handler(&self, message_type: &str) -> bool {
		self.registry.handlers.read().contains_key(message_type)
	}

	/// Returns `true` once the broker's listener is attached to the channel.
	pub fn is_listening(&self) -> bool {
		self.listener_attached.load(Ordering::Acquire)
	}

	/// Counters shared by every clone of this broker.
	pub fn metrics(&self) -> &BrokerMetrics {
		&self.registry.metrics
	}

	fn ensure_listener(&self) {
		if self.listener_attached.swap(true, Ordering::AcqRel) {
			return;
		}

		let registry = self.registry.clone();

		self.channel.add_listener(Arc::new(
			move |raw: Value, sender: Option<MessageSender>| -> Option<ReplyFuture> {
				registry.dispatch(raw, sender)
			},
		));
	}
}
impl<C> Clone for MessageBroker<C>
where
	C: ?Sized + MessageChannel,
{
	fn clone(&self) -> Self {
		Self {
			channel: self.channel.clone(),
			registry: self.registry.clone(),
			listener_attached: self.listener_attached.clone(),
		}
	}
}
impl<C> Debug for MessageBroker<C>
where
	C: ?Sized + MessageChannel,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut types = self.registry.handlers.read().keys().cloned().collect::<Vec<_>>();

		types.sort();

		f.debug_struct("MessageBroker")
			.field("handlers", &types)
			.field("listening", &self.listener_attached.load(Ordering::Acquire))
			.finish()
	}
}

#[derive(Default)]
struct HandlerRegistry {
	handlers: RwLock<HashMap<String, ErasedHandler>>,
	metrics: BrokerMetrics,
}
impl HandlerRegistry {
	fn dispatch(&self, raw: Value, sender: Option<MessageSender>) -> Option<ReplyFuture> {
		let span = TaskSpan::new(TaskKind::Dispatch, "dispatch");
		let _guard = span.enter();
		let Some(message_type) = Envelope::type_of(&raw).map(str::to_owned) else {
			return self.decline(&span, "Declined message without a type.", &"<untagged>");
		};
		let handler = self.handlers.read().get(&message_type).cloned();
		let Some(handler) = handler else {
			return self.decline(
				&span,
				"Declined message with no registered handler.",
				&message_type,
			);
		};

		self.metrics.handled.fetch_add(1, Ordering::Relaxed);
		span.record_outcome("handled");

		Some(handler(Envelope::take_data(raw), sender).into_future())
	}

	fn decline(
		&self,
		span: &TaskSpan,
		message: &'static str,
		message_type: &dyn Display,
	) -> Option<ReplyFuture> {
		self.metrics.declined.fetch_add(1, Ordering::Relaxed);
		span.debug(message, message_type);
		span.record_outcome("declined");

		None
	}
}

fn encode_response<R>(message_type: &str, response: &R) -> Result<Value, CodecError>
where
	R: ?Sized + Serialize,
{
	serde_json::to_value(response)
		.map_err(|source| CodecError::Encode { message_type: message_type.into(), source })
}
