//! The validated highlight gateway.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hilite_invoker::{ExternalInvoker, InvokeError, JsonValue, call};
use tracing::{debug, trace, warn};

use crate::alias::AliasSet;
use crate::config::GatewayConfig;
use crate::error::{Error, Result, normalize};
use crate::memo::SharedInit;
use crate::request::HighlightRequest;

/// Forwards highlight requests to an external worker after validating the language alias.
///
/// The set of supported aliases is fetched from the worker on first use and kept for the
/// lifetime of the gateway. Concurrent first callers share a single fetch. Highlight
/// results are never cached.
///
/// The gateway owns its invoker: [`Self::dispose`] shuts it down, and dropping an
/// undisposed gateway schedules the shutdown on the current tokio runtime.
pub struct HighlightGateway {
	invoker: Arc<dyn ExternalInvoker>,
	config: GatewayConfig,
	aliases: SharedInit<AliasSet, InvokeError>,
	disposed: AtomicBool,
	shutdown: SharedInit<(), InvokeError>,
}

impl std::fmt::Debug for HighlightGateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HighlightGateway")
			.field("config", &self.config)
			.field("aliases", &self.aliases)
			.field("disposed", &self.is_disposed())
			.field("released", &self.shutdown.is_resolved())
			.finish_non_exhaustive()
	}
}

impl HighlightGateway {
	/// Creates a gateway with the default configuration.
	pub fn new(invoker: impl ExternalInvoker) -> Self {
		Self::with_config(invoker, GatewayConfig::default())
	}

	/// Creates a gateway with `config`.
	pub fn with_config(invoker: impl ExternalInvoker, config: GatewayConfig) -> Self {
		Self::from_shared(Arc::new(invoker), config)
	}

	/// Creates a gateway over an already shared invoker.
	///
	/// The gateway still shuts the invoker down when disposed.
	pub fn from_shared(invoker: Arc<dyn ExternalInvoker>, config: GatewayConfig) -> Self {
		Self {
			invoker,
			config,
			aliases: SharedInit::new(),
			disposed: AtomicBool::new(false),
			shutdown: SharedInit::new(),
		}
	}

	/// Get the gateway configuration.
	pub fn config(&self) -> &GatewayConfig {
		&self.config
	}

	/// Check if the gateway has been disposed.
	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}

	/// Highlights `code` using the configured default class prefix.
	pub async fn highlight<'a>(
		&self,
		code: impl Into<Option<&'a str>>,
		language_alias: impl Into<Option<&'a str>>,
	) -> Result<String> {
		self.highlight_with_prefix(code, language_alias, &self.config.class_prefix).await
	}

	/// Highlights `code` in `language_alias`, prefixing generated classes with `class_prefix`.
	///
	/// Blank `code` is returned unchanged without contacting the worker. A blank
	/// `class_prefix` is forwarded as an empty prefix.
	///
	/// # Errors
	///
	/// * [`Error::InvalidArgument`] if `code` is absent or the alias is not supported.
	/// * [`Error::WorkerFault`] if the worker fails, either while highlighting or while
	///   listing aliases.
	/// * [`Error::Invoker`] for timeouts and other boundary failures.
	pub async fn highlight_with_prefix<'a>(
		&self,
		code: impl Into<Option<&'a str>>,
		language_alias: impl Into<Option<&'a str>>,
		class_prefix: &str,
	) -> Result<String> {
		self.ensure_live()?;
		let Some(code) = code.into() else {
			return Err(Error::null_code());
		};
		if code.trim().is_empty() {
			trace!(len = code.len(), "gateway.highlight.blank");
			return Ok(code.to_owned());
		}

		let language_alias = language_alias.into().unwrap_or_default();
		if !self.is_valid_language_alias(language_alias).await? {
			return Err(Error::unsupported_alias(language_alias));
		}

		let class_prefix = if class_prefix.trim().is_empty() { "" } else { class_prefix };
		debug!(alias = language_alias, class_prefix, len = code.len(), "gateway.highlight");
		let args = vec![
			JsonValue::from(code),
			JsonValue::from(language_alias),
			JsonValue::from(class_prefix),
		];
		call(
			self.invoker.as_ref(),
			&self.config.operations.highlight,
			args,
			self.config.request_timeout(),
		)
		.await
		.map_err(normalize)
	}

	/// Highlights a host-originated request whose fields may be absent.
	pub async fn submit(&self, request: HighlightRequest) -> Result<String> {
		let class_prefix = request.class_prefix.as_deref().unwrap_or(&self.config.class_prefix);
		self.highlight_with_prefix(request.code.as_deref(), request.language_alias.as_deref(), class_prefix)
			.await
	}

	/// Check whether the worker supports `language_alias`.
	///
	/// Absent or blank aliases are rejected without contacting the worker. Otherwise the
	/// alias set is fetched on first use.
	pub async fn is_valid_language_alias<'a>(&self, language_alias: impl Into<Option<&'a str>>) -> Result<bool> {
		self.ensure_live()?;
		let Some(language_alias) = language_alias.into().filter(|alias| !alias.trim().is_empty()) else {
			trace!("gateway.alias.blank");
			return Ok(false);
		};
		Ok(self.aliases().await?.contains(language_alias))
	}

	/// Get the supported aliases, fetching them from the worker on first use.
	pub async fn aliases(&self) -> Result<Arc<AliasSet>> {
		self.ensure_live()?;
		if let Some(aliases) = self.aliases.get() {
			return Ok(aliases);
		}

		let invoker = Arc::clone(&self.invoker);
		let operation = self.config.operations.aliases.clone();
		let timeout = self.config.request_timeout();
		self.aliases
			.get_or_init(move || fetch_aliases(invoker, operation, timeout))
			.await
			.map_err(normalize)
	}

	/// Shuts the worker down.
	///
	/// Concurrent and repeated calls share one shutdown; once it has succeeded, later calls
	/// return `Ok(())` without reaching the invoker. A call cancelled mid-shutdown leaves the
	/// shutdown in flight for the next `dispose` (or the drop) to finish. Every other
	/// operation fails with [`Error::Disposed`] from the first call on.
	pub async fn dispose(&self) -> Result<()> {
		if !self.disposed.swap(true, Ordering::AcqRel) {
			debug!("gateway.dispose");
		}
		release(&self.shutdown, Arc::clone(&self.invoker)).await.map_err(normalize)
	}

	fn ensure_live(&self) -> Result<()> {
		if self.is_disposed() { Err(Error::Disposed) } else { Ok(()) }
	}
}

impl Drop for HighlightGateway {
	fn drop(&mut self) {
		if self.shutdown.is_resolved() {
			return;
		}
		let shutdown = std::mem::take(&mut self.shutdown);
		let invoker = Arc::clone(&self.invoker);
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn(async move {
					if let Err(err) = release(&shutdown, invoker).await {
						warn!(error = %err, "gateway.drop.shutdown_failed");
					}
				});
			}
			Err(_) => warn!("gateway.drop.no_runtime"),
		}
	}
}

/// Runs the invoker shutdown once, joining an attempt already in flight.
async fn release(
	shutdown: &SharedInit<(), InvokeError>,
	invoker: Arc<dyn ExternalInvoker>,
) -> Result<(), InvokeError> {
	shutdown
		.get_or_init(move || async move { invoker.shutdown().await })
		.await
		.map(|_| ())
}

async fn fetch_aliases(
	invoker: Arc<dyn ExternalInvoker>,
	operation: String,
	timeout: Option<Duration>,
) -> Result<AliasSet, InvokeError> {
	debug!(operation = %operation, "gateway.aliases.fetch");
	let listed: Vec<String> = call(invoker.as_ref(), &operation, Vec::new(), timeout).await?;
	let listed_len = listed.len();
	let aliases: AliasSet = listed.into_iter().collect();
	debug!(listed = listed_len, distinct = aliases.len(), "gateway.aliases.fetched");
	Ok(aliases)
}
