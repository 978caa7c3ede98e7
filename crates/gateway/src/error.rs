use hilite_invoker::{InvokeError, WorkerFault};

use crate::memo::InitPanicked;

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by [`crate::HighlightGateway`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The caller passed an argument the gateway refuses; correct it and retry.
	#[error("invalid argument `{argument}`: {reason}")]
	InvalidArgument {
		/// Name of the rejected argument.
		argument: &'static str,
		/// What is wrong with it.
		reason: String,
	},
	/// The worker raised an error while executing the operation.
	#[error("{0}")]
	WorkerFault(WorkerFault),
	/// The invocation failed for a reason other than a worker fault.
	#[error(transparent)]
	Invoker(InvokeError),
	/// The gateway has been disposed.
	#[error("highlight gateway disposed")]
	Disposed,
}

impl Error {
	pub(crate) fn null_code() -> Self {
		Self::InvalidArgument {
			argument: "code",
			reason: "must not be null".into(),
		}
	}

	pub(crate) fn unsupported_alias(alias: &str) -> Self {
		Self::InvalidArgument {
			argument: "language_alias",
			reason: format!("'{alias}' is not a valid language alias"),
		}
	}

	/// Returns `true` for errors the caller can fix by changing its arguments.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(self, Self::InvalidArgument { .. })
	}

	/// Returns the worker fault if the worker raised one.
	pub fn as_worker_fault(&self) -> Option<&WorkerFault> {
		match self {
			Self::WorkerFault(fault) => Some(fault),
			_ => None,
		}
	}
}

impl From<InitPanicked> for InvokeError {
	fn from(_: InitPanicked) -> Self {
		InvokeError::Fault(WorkerFault::new("worker call panicked").with_name("Panic"))
	}
}

/// Maps a boundary failure onto the gateway taxonomy.
///
/// Composite wrappers are peeled to their innermost cause; only that cause is surfaced.
pub(crate) fn normalize(err: InvokeError) -> Error {
	match err.into_innermost() {
		InvokeError::Fault(fault) => Error::WorkerFault(fault),
		other => Error::Invoker(other),
	}
}
