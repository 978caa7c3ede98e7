use std::time::Duration;

use hilite_invoker::{ExternalInvoker, InvokeError, JsonValue, Router, WorkerFault, arg, call};
use pretty_assertions::assert_eq;
use serde_json::json;

fn worker() -> Router {
	Router::new()
		.operation("getAliases", |_args| async { Ok(json!(["python", "go"])) })
		.operation("highlight", |args: Vec<JsonValue>| async move {
			let code: String = arg(&args, 0)?;
			let alias: String = arg(&args, 1)?;
			let prefix: String = arg(&args, 2)?;
			Ok::<_, WorkerFault>(json!(format!("<span class=\"{prefix}{alias}\">{code}</span>")))
		})
		.operation("stall", |_args| async {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(JsonValue::Null)
		})
}

#[tokio::test]
async fn call_decodes_typed_results() {
	let router = worker();
	let aliases: Vec<String> = call(&router, "getAliases", Vec::new(), None).await.unwrap();
	assert_eq!(aliases, vec!["python".to_owned(), "go".to_owned()]);

	let html: String = call(&router, "highlight", vec![json!("x"), json!("go"), json!("hl-")], None)
		.await
		.unwrap();
	assert_eq!(html, "<span class=\"hl-go\">x</span>");
}

#[tokio::test]
async fn call_reports_decode_failures() {
	let err = call::<u64, _>(&worker(), "getAliases", Vec::new(), None).await.unwrap_err();
	match err {
		InvokeError::Decode { operation, .. } => assert_eq!(operation, "getAliases"),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn call_passes_worker_faults_through() {
	let err = call::<String, _>(&worker(), "highlight", vec![json!("x")], None).await.unwrap_err();
	assert_eq!(
		err,
		InvokeError::Fault(WorkerFault::new("missing argument 1").with_name("TypeError"))
	);
}

#[tokio::test(start_paused = true)]
async fn call_enforces_timeout() {
	let router = worker();
	let err = call::<JsonValue, _>(&router, "stall", Vec::new(), Some(Duration::from_secs(5)))
		.await
		.unwrap_err();
	assert_eq!(
		err,
		InvokeError::Timeout {
			operation: "stall".into(),
			after: Duration::from_secs(5),
		}
	);
	router.shutdown().await.unwrap();
}

#[tokio::test]
async fn call_works_through_trait_objects() {
	let invoker: Box<dyn ExternalInvoker> = Box::new(worker());
	let aliases: Vec<String> = call(invoker.as_ref(), "getAliases", Vec::new(), None).await.unwrap();
	assert_eq!(aliases.len(), 2);
}
