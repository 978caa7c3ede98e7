use serde::Deserialize;

/// A highlight request as it arrives from the host.
///
/// Every field may be absent; the gateway validates them the same way it validates direct
/// calls. A missing `class_prefix` falls back to the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRequest {
	/// Source text to highlight.
	#[serde(default)]
	pub code: Option<String>,
	/// Language alias the worker should use.
	#[serde(default)]
	pub language_alias: Option<String>,
	/// Prefix for generated CSS classes.
	#[serde(default)]
	pub class_prefix: Option<String>,
}

impl HighlightRequest {
	/// Creates a request for `code` in `language_alias` with the default class prefix.
	pub fn new(code: impl Into<String>, language_alias: impl Into<String>) -> Self {
		Self {
			code: Some(code.into()),
			language_alias: Some(language_alias.into()),
			class_prefix: None,
		}
	}

	/// Overrides the class prefix.
	pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.class_prefix = Some(prefix.into());
		self
	}
}
