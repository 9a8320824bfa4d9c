use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use basehealth_node::config::NodeConfig;
use basehealth_node::controller::WorkflowController;
use basehealth_node::ledger::{InMemoryLedger, LedgerClient};
use basehealth_node::server::build_router;
use serde_json::{json, Value};
use tower::ServiceExt;

const OWNER: &str = "0x1111111111111111111111111111111111111111";
const GRANTEE: &str = "0x2222222222222222222222222222222222222222";

fn router(cfg: NodeConfig) -> (Arc<InMemoryLedger>, Router) {
    let ledger = Arc::new(InMemoryLedger::new());
    let client: Arc<dyn LedgerClient> = ledger.clone();
    let ctrl = WorkflowController::new(client, &cfg);
    (ledger, build_router(ctrl))
}

fn live() -> NodeConfig {
    NodeConfig {
        contract: "0xd8b934580fcE35a11B58C6D73aDeE468a2833fa8".parse().unwrap(),
        ..NodeConfig::default()
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn wait_for_phase(app: &Router, pipeline: &str, phase: &str) -> Value {
    for _ in 0..500 {
        let (_, view) = call(app, "GET", "/v1/session", None).await;
        if view[pipeline]["phase"] == phase {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never reached {}", pipeline, phase);
}

#[tokio::test]
async fn test_submit_over_http() {
    let (ledger, app) = router(live());

    let (status, body) = call(&app, "POST", "/v1/account", Some(json!({ "address": OWNER }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["records"], 0);

    let (status, body) = call(
        &app,
        "POST",
        "/v1/file",
        Some(json!({ "name": "A", "content_hex": hex::encode("report-v1") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["staged"], "A");

    let (status, body) = call(&app, "POST", "/v1/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], true);
    assert!(body["ignored"].is_null());

    let view = wait_for_phase(&app, "submit", "succeeded").await;
    assert_eq!(view["submit"]["ledger_reference"].as_str().map(str::len), Some(66));

    // The refetch lands after the phase flips; ask for one explicitly.
    let (_, body) = call(&app, "POST", "/v1/records/refresh", None).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["records"], 1);

    let (_, view) = call(&app, "GET", "/v1/session", None).await;
    assert_eq!(view["records"][0]["label"], "A");
    assert_eq!(view["records"][0]["provenance"], "confirmed");
    assert_eq!(view["demo_mode"], false);
    assert_eq!(ledger.records_of(&OWNER.parse().unwrap()).len(), 1);

    let id = view["notifications"][0]["id"].as_u64().unwrap();
    let (_, body) = call(&app, "DELETE", &format!("/v1/notifications/{}", id), None).await;
    assert_eq!(body["dismissed"], true);
}

#[tokio::test]
async fn test_ignored_intents_report_reason() {
    let (_, app) = router(live());

    let (status, body) = call(&app, "POST", "/v1/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], false);
    assert_eq!(body["ignored"], "not_connected");

    call(&app, "POST", "/v1/account", Some(json!({ "address": OWNER }))).await;
    let (_, body) = call(&app, "POST", "/v1/share", Some(json!({ "grantee": GRANTEE }))).await;
    assert_eq!(body["ignored"], "no_records");
}

#[tokio::test]
async fn test_bad_input_is_400() {
    let (_, app) = router(live());

    let (status, body) = call(&app, "POST", "/v1/account", Some(json!({ "address": "0x12" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        "POST",
        "/v1/file",
        Some(json!({ "name": "A", "content_hex": "zz" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", "/v1/file", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disconnect_clears_session() {
    let (ledger, app) = router(live());
    ledger.seed_record(OWNER.parse().unwrap(), &basehealth_core::Fingerprint::parse("ab").unwrap());

    let (_, body) = call(&app, "POST", "/v1/account", Some(json!({ "address": OWNER }))).await;
    assert_eq!(body["records"], 1);

    let (_, body) = call(&app, "POST", "/v1/account", Some(json!({ "address": null }))).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["records"], 0);

    let (_, view) = call(&app, "GET", "/v1/session", None).await;
    assert_eq!(view["connected"], false);
    assert_eq!(view["submit"]["phase"], "idle");
}

#[tokio::test]
async fn test_demo_mode_share_over_http() {
    let (ledger, app) = router(NodeConfig::default());
    call(&app, "POST", "/v1/account", Some(json!({ "address": OWNER }))).await;
    call(
        &app,
        "POST",
        "/v1/file",
        Some(json!({ "name": "B", "content_hex": hex::encode("scan") })),
    )
    .await;
    call(&app, "POST", "/v1/submit", None).await;
    let view = wait_for_phase(&app, "submit", "succeeded").await;
    assert_eq!(view["demo_mode"], true);
    assert_eq!(view["records"][0]["provenance"], "local_only");
    assert!(view["records"][0]["tx"].is_null());

    let (_, body) = call(&app, "POST", "/v1/share", Some(json!({ "grantee": GRANTEE }))).await;
    assert_eq!(body["started"], true);
    let (_, view) = call(&app, "GET", "/v1/session", None).await;
    assert_eq!(view["share"]["phase"], "succeeded");
    assert_eq!(ledger.write_calls() + ledger.read_calls(), 0);
}

#[tokio::test]
async fn test_cross_origin_callers_get_no_cors_grant() {
    let (_, app) = router(live());

    let req = Request::builder()
        .method("POST")
        .uri("/v1/file")
        .header("origin", "https://elsewhere.example")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "A", "content_hex": "00" }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/v1/file")
        .header("origin", "https://elsewhere.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(preflight).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
    assert_ne!(resp.status(), StatusCode::OK);
}
