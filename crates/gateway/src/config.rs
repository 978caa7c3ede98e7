//! Gateway configuration.

use std::time::Duration;

use serde::Deserialize;

/// Class prefix the bundled highlighter uses when none is configured.
pub const DEFAULT_CLASS_PREFIX: &str = "hljs-";

/// Names of the worker operations the gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperationNames {
	/// `highlight(code, languageAlias, classPrefix) -> string`.
	pub highlight: String,
	/// `getAliases() -> string[]`.
	pub aliases: String,
}

impl Default for OperationNames {
	fn default() -> Self {
		Self {
			highlight: "highlight".into(),
			aliases: "getAliases".into(),
		}
	}
}

/// Configuration for a [`crate::HighlightGateway`].
///
/// Deserializable so hosts can embed it in their own settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
	/// Prefix applied to generated CSS classes when the caller does not pass one.
	pub class_prefix: String,
	/// Per-invocation timeout in seconds; `0` waits indefinitely.
	pub timeout_secs: u64,
	/// Worker operation names.
	pub operations: OperationNames,
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			class_prefix: DEFAULT_CLASS_PREFIX.into(),
			timeout_secs: 0,
			operations: OperationNames::default(),
		}
	}
}

impl GatewayConfig {
	/// Create a configuration with defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the default class prefix.
	pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.class_prefix = prefix.into();
		self
	}

	/// Set request timeout.
	pub fn timeout(mut self, secs: u64) -> Self {
		self.timeout_secs = secs;
		self
	}

	/// Rename the worker operations.
	pub fn operations(mut self, highlight: impl Into<String>, aliases: impl Into<String>) -> Self {
		self.operations = OperationNames {
			highlight: highlight.into(),
			aliases: aliases.into(),
		};
		self
	}

	pub(crate) fn request_timeout(&self) -> Option<Duration> {
		(self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
	}
}
