//! Validated syntax-highlighting gateway.
//!
//! Highlighting itself happens in an external worker running a bundled highlighter,
//! reached through [`hilite_invoker::ExternalInvoker`]. This crate validates requests
//! before they cross that boundary and normalizes what comes back:
//! * [`HighlightGateway`]: alias validation, request forwarding, disposal
//! * [`SharedInit`]: single-flight memoization of the worker's alias listing
//! * [`Error`]: invalid arguments versus worker faults

#![warn(missing_docs)]

mod alias;
pub mod config;
mod error;
mod gateway;
pub mod memo;
mod request;

pub use alias::AliasSet;
pub use config::{DEFAULT_CLASS_PREFIX, GatewayConfig, OperationNames};
pub use error::{Error, Result};
pub use gateway::HighlightGateway;
/// Re-export of the invoker boundary this gateway is built on.
pub use hilite_invoker as invoker;
pub use memo::{InitPanicked, SharedInit};
pub use request::HighlightRequest;
