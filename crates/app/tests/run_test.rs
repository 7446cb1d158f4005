//! End-to-end tests: plan file on disk, mock HTTP server, JSON report out.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use ricochet::commands::{self, EXIT_FAIL, EXIT_PASS};
use ricochet::{CheckArgs, RunArgs};
use ricochet_application::{CancellationToken, TransportFailurePolicy};
use ricochet_domain::Outcome;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_plan(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let plan_path = dir.path().join(name);
    std::fs::write(&plan_path, contents).expect("Failed to write plan");
    plan_path
}

async fn order_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"o-1"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/orders/o-1"))
        .respond_with(ResponseTemplate::new(202).set_body_string("processing"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(path("/orders/o-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("shipped"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_run_plan_passes_and_writes_report() {
    let server = order_service().await;
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "orders.yaml",
        &format!(
            r#"
name: orders
requests:
  - name: create
    method: POST
    url: {uri}/orders
    headers:
      Content-Type: application/json
    body:
      sku: A-1
    validate:
      - kind: status_code_equals
        expected: 201
  - name: track
    url: {uri}/orders/o-1
    retry:
      until: status_code_equals
      expected: 200
      max_retries: 3
      interval_ms: 5
    validate:
      - kind: body_equals
        expected: shipped
"#,
            uri = server.uri()
        ),
    );
    let report_path = temp_dir.path().join("out").join("report.json");

    let args = RunArgs {
        report: Some(report_path.clone()),
        ..RunArgs::new(&plan)
    };
    let report = commands::run(&args, None).await.unwrap();

    assert_eq!(report.outcome, Outcome::Pass);
    assert_eq!(commands::exit_status(report.outcome), EXIT_PASS);
    assert_eq!(report.total_exchanges(), 3);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["outcome"], "pass");
    assert_eq!(written["specs"][1]["retry"]["state"], "satisfied");
    assert_eq!(written["specs"][1]["retry"]["attempt"], 2);
}

#[tokio::test]
async fn test_failed_validation_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("degraded"))
        .mount(&server)
        .await;
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "health.json",
        &format!(
            r#"{{"requests": [{{"url": "{}/health", "validate": [{{"kind": "body_does_not_include", "expected": "degraded"}}]}}]}}"#,
            server.uri()
        ),
    );

    let report = commands::run(&RunArgs::new(&plan), None).await.unwrap();

    assert_eq!(report.outcome, Outcome::Fail);
    assert_eq!(commands::exit_status(report.outcome), EXIT_FAIL);
    assert_eq!(
        report.specs[0].failure.as_deref(),
        Some("Body includes unwanted value: degraded")
    );
    assert!(commands::render_summary(&report).starts_with("FAIL 200"));
}

#[tokio::test]
async fn test_transport_failure_override_aborts_run() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "down.yaml",
        &format!("requests:\n  - url: http://127.0.0.1:{port}/\n  - url: http://127.0.0.1:{port}/again\n"),
    );

    let continued = commands::run(&RunArgs::new(&plan), None).await.unwrap();
    assert_eq!(continued.outcome, Outcome::Fail);
    assert_eq!(continued.specs.len(), 2);
    assert!(continued.specs[0].transport_error.is_some());

    let args = RunArgs {
        transport_failure: Some(TransportFailurePolicy::AbortRun),
        ..RunArgs::new(&plan)
    };
    let err = commands::run(&args, None).await.unwrap_err();
    assert!(format!("{err:#}").contains("transport failure"));
}

#[tokio::test]
async fn test_misconfigured_plan_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "bad.yaml",
        &format!(
            "requests:\n  - url: {}/a\n    retry:\n      until: status_code_equals\n      expected: abc\n      max_retries: 2\n",
            server.uri()
        ),
    );

    let err = commands::run(&RunArgs::new(&plan), None).await.unwrap_err();
    assert!(format!("{err:#}").contains("misconfigured"));

    let err = commands::check(&CheckArgs { plan }).await.unwrap_err();
    assert!(format!("{err:#}").contains("got 'abc'"));
}

#[tokio::test]
async fn test_cancelled_run_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "cancel.yaml",
        &format!("requests:\n  - url: {}/a\n", server.uri()),
    );
    let (token, receiver) = CancellationToken::new();
    token.cancel();

    let report = commands::run(&RunArgs::new(&plan), Some(receiver))
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.outcome, Outcome::Fail);
}

#[tokio::test]
async fn test_check_lists_requests() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let plan = write_plan(
        &temp_dir,
        "smoke.yml",
        "requests:\n  - name: health\n    url: http://svc/health\n    retry:\n      until: status_code_equals\n      expected: 200\n      max_retries: 5\n  - url: http://svc/version\n",
    );

    let summary = commands::check(&CheckArgs { plan }).await.unwrap();

    assert_eq!(
        summary,
        "plan 'smoke': 2 request(s)\n   1. health (retry until status_code_equals up to 5 times)\n   2. GET http://svc/version\n"
    );
}
