//! Single-flight memoization of an asynchronous computation.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

/// Outcome of a computation that panicked instead of completing.
///
/// Error types used with [`SharedInit::get_or_init`] convert from it, so a panicking attempt
/// is reported to its waiters like any other failure and then forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPanicked;

impl std::fmt::Display for InitPanicked {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("initialization panicked")
	}
}

impl std::error::Error for InitPanicked {}

type Pending<T, E> = Shared<BoxFuture<'static, Result<Arc<T>, E>>>;

enum Slot<T, E> {
	Empty,
	Pending { generation: u64, fut: Pending<T, E> },
	Ready(Arc<T>),
}

struct State<T, E> {
	slot: Slot<T, E>,
	generation: u64,
}

/// Lazily computed value shared by all callers.
///
/// The first caller starts the computation; callers arriving while it runs attach to the
/// same in-flight future and observe the same outcome. A successful result is kept for the
/// lifetime of the cell. A failure is handed to every waiter of that attempt and then
/// forgotten, so the next caller starts a fresh attempt. A panic counts as a failure.
///
/// Dropping one waiter does not cancel the computation for the others.
pub struct SharedInit<T, E> {
	state: Mutex<State<T, E>>,
}

impl<T, E> Default for SharedInit<T, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T, E> std::fmt::Debug for SharedInit<T, E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		let slot = match state.slot {
			Slot::Empty => "empty",
			Slot::Pending { .. } => "pending",
			Slot::Ready(_) => "ready",
		};
		f.debug_struct("SharedInit")
			.field("slot", &slot)
			.field("attempts", &state.generation)
			.finish()
	}
}

impl<T, E> SharedInit<T, E> {
	/// Creates an unresolved cell.
	pub fn new() -> Self {
		Self {
			state: Mutex::new(State {
				slot: Slot::Empty,
				generation: 0,
			}),
		}
	}

	/// Returns the value if a computation has succeeded.
	pub fn get(&self) -> Option<Arc<T>> {
		match &self.state.lock().slot {
			Slot::Ready(value) => Some(Arc::clone(value)),
			_ => None,
		}
	}

	/// Returns `true` once a computation has succeeded.
	pub fn is_resolved(&self) -> bool {
		matches!(self.state.lock().slot, Slot::Ready(_))
	}

	/// Returns `true` while a computation is in flight.
	pub fn is_pending(&self) -> bool {
		matches!(self.state.lock().slot, Slot::Pending { .. })
	}
}

impl<T, E> SharedInit<T, E>
where
	T: Send + Sync + 'static,
	E: Clone + From<InitPanicked> + Send + Sync + 'static,
{
	/// Returns the memoized value, running `init` only if nothing is resolved or in flight.
	pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Arc<T>, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>> + Send + 'static,
	{
		let (generation, fut) = {
			let mut state = self.state.lock();
			match &state.slot {
				Slot::Ready(value) => return Ok(Arc::clone(value)),
				Slot::Pending { generation, fut } => (*generation, fut.clone()),
				Slot::Empty => {
					state.generation += 1;
					let generation = state.generation;
					let fut = AssertUnwindSafe(init())
						.catch_unwind()
						.map(|caught| match caught {
							Ok(res) => res.map(Arc::new),
							Err(_) => Err(E::from(InitPanicked)),
						})
						.boxed()
						.shared();
					state.slot = Slot::Pending {
						generation,
						fut: fut.clone(),
					};
					(generation, fut)
				}
			}
		};

		let outcome = fut.await;

		let mut state = self.state.lock();
		if let Slot::Pending { generation: current, .. } = state.slot
			&& current == generation
		{
			state.slot = match &outcome {
				Ok(value) => Slot::Ready(Arc::clone(value)),
				Err(_) => Slot::Empty,
			};
		}
		outcome
	}
}
