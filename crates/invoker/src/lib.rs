//! Opaque boundary to an external highlighter worker.
//!
//! The worker is reached by operation name plus positional JSON arguments. How the
//! request gets there (a JavaScript engine in a child process, an embedded runtime, an
//! in-process [`Router`]) is the implementor's business:
//! * [`ExternalInvoker`]: the async invocation trait
//! * [`call`]: typed invocation with an optional timeout
//! * [`InvokeError`] / [`WorkerFault`]: boundary error taxonomy
//! * [`Router`]: in-process worker dispatching names to async handlers

#![warn(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
/// Positional arguments and results exchanged with the worker.
pub use serde_json::Value as JsonValue;

pub mod error;
pub mod router;

pub use error::{InvokeError, WorkerFault};
pub use router::{Router, arg};

/// A convenient type alias for `Result` with `E` = [`InvokeError`].
pub type Result<T, E = InvokeError> = std::result::Result<T, E>;

/// Executes named operations in an external worker.
#[async_trait]
pub trait ExternalInvoker: Send + Sync + 'static {
	/// Runs `operation` with positional `args` and returns its JSON result.
	async fn invoke(&self, operation: &str, args: Vec<JsonValue>) -> Result<JsonValue>;

	/// Releases the worker (terminates the process, closes the connection).
	///
	/// Implementations must tolerate being called more than once.
	async fn shutdown(&self) -> Result<()> {
		Ok(())
	}
}

/// Invokes `operation` and decodes its result into `T`.
///
/// A `timeout` of `None` waits for the worker indefinitely.
pub async fn call<T, I>(invoker: &I, operation: &str, args: Vec<JsonValue>, timeout: Option<Duration>) -> Result<T>
where
	T: DeserializeOwned,
	I: ExternalInvoker + ?Sized,
{
	let pending = invoker.invoke(operation, args);
	let value = match timeout {
		Some(after) => tokio::time::timeout(after, pending)
			.await
			.map_err(|_| InvokeError::Timeout {
				operation: operation.to_owned(),
				after,
			})??,
		None => pending.await?,
	};
	serde_json::from_value(value).map_err(|err| InvokeError::Decode {
		operation: operation.to_owned(),
		reason: err.to_string(),
	})
}
