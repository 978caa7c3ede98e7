//! Gateway driving an in-process worker through the invoker boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hilite::invoker::{ExternalInvoker, InvokeError, JsonValue, Router, WorkerFault, arg};
use hilite::{Error, GatewayConfig, HighlightGateway, HighlightRequest};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::TRACE)
		.try_init();
}

/// Toy highlighter: wraps every whitespace-separated word in a span.
fn worker(alias_listings: Arc<AtomicUsize>) -> Router {
	Router::new()
		.operation("listLanguages", move |_args| {
			let alias_listings = Arc::clone(&alias_listings);
			async move {
				alias_listings.fetch_add(1, Ordering::SeqCst);
				Ok(json!(["rust", "rs", "toml", "rust"]))
			}
		})
		.operation("render", |args: Vec<JsonValue>| async move {
			let code: String = arg(&args, 0)?;
			let alias: String = arg(&args, 1)?;
			let prefix: String = arg(&args, 2)?;
			if alias == "toml" {
				return Err(WorkerFault::new("grammar crashed").with_name("RangeError"));
			}
			let html = code
				.split_whitespace()
				.map(|word| format!("<span class=\"{prefix}word\">{word}</span>"))
				.collect::<Vec<_>>()
				.join(" ");
			Ok::<_, WorkerFault>(json!(html))
		})
}

fn config() -> GatewayConfig {
	GatewayConfig::new().operations("render", "listLanguages")
}

#[tokio::test]
async fn highlights_through_router() {
	init_tracing();
	let listings = Arc::new(AtomicUsize::new(0));
	let gateway = HighlightGateway::with_config(worker(Arc::clone(&listings)), config());

	let html = gateway.highlight("fn main", "rs").await.unwrap();
	assert_eq!(html, "<span class=\"hljs-word\">fn</span> <span class=\"hljs-word\">main</span>");

	let html = gateway
		.submit(HighlightRequest::new("let", "rust").class_prefix(" "))
		.await
		.unwrap();
	assert_eq!(html, "<span class=\"word\">let</span>");

	assert_eq!(gateway.aliases().await.unwrap().len(), 3);
	assert_eq!(listings.load(Ordering::SeqCst), 1);
	gateway.dispose().await.unwrap();
}

#[tokio::test]
async fn worker_faults_surface_with_their_message() {
	init_tracing();
	let gateway = HighlightGateway::with_config(worker(Arc::default()), config());

	let err = gateway.highlight("[package]", "toml").await.unwrap_err();

	assert_eq!(
		err,
		Error::WorkerFault(WorkerFault::new("grammar crashed").with_name("RangeError"))
	);
	assert_eq!(err.to_string(), "RangeError: grammar crashed");
}

#[tokio::test]
async fn misnamed_operations_are_boundary_errors() {
	init_tracing();
	let gateway = HighlightGateway::new(worker(Arc::default()));

	let err = gateway.is_valid_language_alias("rust").await.unwrap_err();

	assert_eq!(err, Error::Invoker(InvokeError::UnknownOperation("getAliases".into())));
}

#[tokio::test]
async fn dispose_stops_the_worker() {
	init_tracing();
	let router = Arc::new(worker(Arc::default()));
	let gateway = HighlightGateway::from_shared(router.clone(), config());

	assert!(gateway.is_valid_language_alias("toml").await.unwrap());
	gateway.dispose().await.unwrap();

	assert!(router.is_stopped());
	assert_eq!(router.invoke("render", Vec::new()).await.unwrap_err(), InvokeError::Stopped);
	assert_eq!(gateway.aliases().await.unwrap_err(), Error::Disposed);
}
