//! In-process worker that dispatches operation names to async handlers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::{Deserialize, DeserializeOwned};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{ExternalInvoker, InvokeError, JsonValue, Result, WorkerFault};

type Handler = Arc<dyn Fn(Vec<JsonValue>) -> BoxFuture<'static, Result<JsonValue, WorkerFault>> + Send + Sync>;

/// Invoker that runs operations as tokio tasks inside the host process.
///
/// Each invocation runs on its own task, so a panicking handler is reported as a
/// [`WorkerFault`] instead of unwinding into the caller. [`ExternalInvoker::shutdown`]
/// cancels everything in flight.
#[derive(Default)]
pub struct Router {
	handlers: HashMap<String, Handler>,
	cancel: CancellationToken,
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("operations", &self.handlers.keys().collect::<Vec<_>>())
			.field("stopped", &self.cancel.is_cancelled())
			.finish()
	}
}

impl Router {
	/// Creates a router with no operations.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` under `name`, replacing any previous handler.
	pub fn operation<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
	where
		F: Fn(Vec<JsonValue>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<JsonValue, WorkerFault>> + Send + 'static,
	{
		self.handlers.insert(name.into(), Arc::new(move |args| handler(args).boxed()));
		self
	}

	/// Returns `true` if `name` is registered.
	pub fn has_operation(&self, name: &str) -> bool {
		self.handlers.contains_key(name)
	}

	/// Returns `true` once the router has been shut down.
	pub fn is_stopped(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

/// Aborts the handler task when the invocation future is dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
	fn drop(&mut self) {
		self.0.abort();
	}
}

#[async_trait]
impl ExternalInvoker for Router {
	async fn invoke(&self, operation: &str, args: Vec<JsonValue>) -> Result<JsonValue> {
		if self.cancel.is_cancelled() {
			return Err(InvokeError::Stopped);
		}
		let Some(handler) = self.handlers.get(operation) else {
			return Err(InvokeError::UnknownOperation(operation.to_owned()));
		};

		trace!(operation, args = args.len(), "router.invoke");
		let mut task = tokio::spawn(handler(args));
		let _abort = AbortOnDrop(task.abort_handle());

		tokio::select! {
			joined = &mut task => match joined {
				Ok(result) => result.map_err(InvokeError::Fault),
				Err(err) if err.is_panic() => {
					warn!(operation, "router.handler_panicked");
					Err(InvokeError::Fault(
						WorkerFault::new(format!("operation `{operation}` panicked")).with_name("Panic"),
					))
				}
				Err(_) => Err(InvokeError::Stopped),
			},
			() = self.cancel.cancelled() => Err(InvokeError::Stopped),
		}
	}

	async fn shutdown(&self) -> Result<()> {
		if !self.cancel.is_cancelled() {
			debug!(operations = self.handlers.len(), "router.shutdown");
			self.cancel.cancel();
		}
		Ok(())
	}
}

/// Decodes positional argument `index` for a handler.
///
/// Missing or mistyped arguments are reported the way a JavaScript worker would, as a
/// `TypeError` fault.
pub fn arg<T: DeserializeOwned>(args: &[JsonValue], index: usize) -> Result<T, WorkerFault> {
	let value = args
		.get(index)
		.ok_or_else(|| WorkerFault::new(format!("missing argument {index}")).with_name("TypeError"))?;
	<T as Deserialize<'_>>::deserialize(value)
		.map_err(|err| WorkerFault::new(format!("argument {index}: {err}")).with_name("TypeError"))
}
