use std::collections::HashSet;

/// Language identifiers the worker accepts.
///
/// Built once from the worker's alias listing and never mutated afterwards. Lookups are
/// exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSet {
	aliases: HashSet<String>,
}

impl AliasSet {
	/// Returns `true` if `alias` is supported.
	pub fn contains(&self, alias: &str) -> bool {
		self.aliases.contains(alias)
	}

	/// Number of distinct aliases.
	pub fn len(&self) -> usize {
		self.aliases.len()
	}

	/// Returns `true` if the worker reported no aliases.
	pub fn is_empty(&self) -> bool {
		self.aliases.is_empty()
	}

	/// Iterates the aliases in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.aliases.iter().map(String::as_str)
	}
}

impl<S: Into<String>> FromIterator<S> for AliasSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			aliases: iter.into_iter().map(Into::into).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicates_collapse() {
		let set: AliasSet = ["python", "go", "go"].into_iter().collect();
		assert_eq!(set.len(), 2);
		assert!(set.contains("python"));
		assert!(set.contains("go"));
	}

	#[test]
	fn lookups_are_case_sensitive() {
		let set: AliasSet = ["rust"].into_iter().collect();
		assert!(!set.contains("Rust"));
		assert!(!set.contains(" rust"));
		assert!(set.contains("rust"));
	}
}
