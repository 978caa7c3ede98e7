//! Boundary error taxonomy for external invocations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An error raised by the worker itself while executing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFault {
	/// Human-readable message reported by the worker.
	pub message: String,
	/// Worker-side error type name (e.g. `TypeError`), when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Worker-side stack trace, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack: Option<String>,
}

impl WorkerFault {
	/// Creates a fault carrying only a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			name: None,
			stack: None,
		}
	}

	/// Sets the worker-side error type name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the worker-side stack trace.
	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}
}

impl fmt::Display for WorkerFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{name}: {}", self.message),
			None => f.write_str(&self.message),
		}
	}
}

impl std::error::Error for WorkerFault {}

impl From<&str> for WorkerFault {
	fn from(message: &str) -> Self {
		Self::new(message)
	}
}

impl From<String> for WorkerFault {
	fn from(message: String) -> Self {
		Self::new(message)
	}
}

/// Failure of an external invocation.
///
/// Every variant is `Clone` so a single in-flight invocation can hand the same outcome to
/// any number of waiters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum InvokeError {
	/// The worker raised an error while executing the operation.
	#[error("worker fault: {0}")]
	Fault(WorkerFault),
	/// Composite wrapper produced by an asynchronous invocation mechanism.
	#[error("{} error(s) occurred during invocation", .0.len())]
	Aggregate(Vec<InvokeError>),
	/// The worker does not know the requested operation.
	#[error("unknown operation `{0}`")]
	UnknownOperation(String),
	/// The operation did not complete in time.
	#[error("operation `{operation}` timed out after {after:?}")]
	Timeout {
		/// Operation name.
		operation: String,
		/// Elapsed budget.
		after: Duration,
	},
	/// The worker returned a value of an unexpected shape.
	#[error("failed to decode result of `{operation}`: {reason}")]
	Decode {
		/// Operation name.
		operation: String,
		/// Decoder message.
		reason: String,
	},
	/// The worker was shut down or is otherwise unreachable.
	#[error("worker stopped")]
	Stopped,
}

impl InvokeError {
	/// Wraps errors the way asynchronous invocation layers report them.
	pub fn aggregate(inner: impl IntoIterator<Item = InvokeError>) -> Self {
		Self::Aggregate(inner.into_iter().collect())
	}

	/// Peels composite wrappers down to the innermost cause.
	///
	/// Follows the first inner error of each [`InvokeError::Aggregate`]. An empty aggregate
	/// has no cause to surface and is returned as is.
	pub fn into_innermost(self) -> Self {
		let mut err = self;
		loop {
			match err {
				Self::Aggregate(inner) => match inner.into_iter().next() {
					Some(first) => err = first,
					None => return Self::Aggregate(Vec::new()),
				},
				other => return other,
			}
		}
	}

	/// Returns the worker fault if this is one.
	pub fn as_fault(&self) -> Option<&WorkerFault> {
		match self {
			Self::Fault(fault) => Some(fault),
			_ => None,
		}
	}
}

impl From<WorkerFault> for InvokeError {
	fn from(fault: WorkerFault) -> Self {
		Self::Fault(fault)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn innermost_follows_first_inner_error() {
		let err = InvokeError::aggregate([
			InvokeError::aggregate([InvokeError::Fault(WorkerFault::new("deep"))]),
			InvokeError::Stopped,
		]);
		assert_eq!(err.into_innermost(), InvokeError::Fault(WorkerFault::new("deep")));
	}

	#[test]
	fn innermost_keeps_plain_errors() {
		let err = InvokeError::UnknownOperation("nope".into());
		assert_eq!(err.clone().into_innermost(), err);
		assert_eq!(InvokeError::Aggregate(Vec::new()).into_innermost(), InvokeError::Aggregate(Vec::new()));
	}

	#[test]
	fn fault_display_includes_name() {
		let fault = WorkerFault::new("Unknown language: \"cobol\"").with_name("Error");
		assert_eq!(fault.to_string(), "Error: Unknown language: \"cobol\"");
		assert_eq!(WorkerFault::from("boom").to_string(), "boom");
	}

	#[test]
	fn fault_deserializes_from_worker_payload() {
		let fault: WorkerFault = serde_json::from_value(serde_json::json!({
			"message": "bad input",
			"stack": "at highlight (bundle.js:1:1)"
		}))
		.unwrap();
		assert_eq!(fault, WorkerFault::new("bad input").with_stack("at highlight (bundle.js:1:1)"));
	}
}
