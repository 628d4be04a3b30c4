//! Background core for browser extensions: alarm-driven OAuth token refresh that survives host
//! suspension, plus a single-dispatch message broker that answers every request exactly once.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod alarm;
pub mod auth;
pub mod error;
pub mod messaging;
pub mod obs;
pub mod refresh;
pub mod runtime;
pub mod scheduler;
pub mod store;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use serde_json;
pub use url;
