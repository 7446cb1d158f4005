//! Integration tests for the reqwest transport against a local mock server.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ricochet_application::{HttpTransport, RequestExecutionEngine, TransportError};
use ricochet_domain::{HttpMethod, Outcome, PredicateKind, RequestSpec, RetryState};
use ricochet_infrastructure::{ReqwestTransport, SystemClock, TokioSleeper, TransportSettings};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(TransportSettings::default()).expect("client should build")
}

#[tokio::test]
async fn test_issue_sends_method_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/orders/7"))
        .and(header("authorization", "Bearer 1234"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"qty":2}"#))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_string("accepted")
                .insert_header("x-request-id", "abc"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = RequestSpec::new(HttpMethod::Put, format!("{}/orders/7", server.uri()))
        .with_bearer("1234")
        .with_content_type("application/json")
        .with_body(r#"{"qty":2}"#);

    let response = transport().issue(&spec).await.unwrap();

    assert_eq!(response.status, 202);
    assert_eq!(response.body, "accepted");
    assert_eq!(response.get_header("X-Request-Id"), Some("abc"));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    let settings = TransportSettings::default();
    Mock::given(header("user-agent", settings.user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = ReqwestTransport::new(settings)
        .unwrap()
        .issue(&RequestSpec::get(server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_non_success_status_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let response = transport()
        .issue(&RequestSpec::get(server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.body, "boom");
}

#[tokio::test]
async fn test_per_request_timeout_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let spec = RequestSpec::get(server.uri()).with_timeout_ms(50);
    let result = transport().issue(&spec).await;

    assert_eq!(result, Err(TransportError::Timeout { timeout_ms: 50 }));
}

#[tokio::test]
async fn test_closed_port_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = transport()
        .issue(&RequestSpec::get(format!("http://127.0.0.1:{port}/")))
        .await;

    assert!(matches!(
        result,
        Err(TransportError::ConnectionRefused { .. } | TransportError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn test_engine_retries_against_live_server() {
    let server = MockServer::start().await;
    Mock::given(path("/jobs/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("state: pending"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(path("/jobs/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("state: done"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = RequestExecutionEngine::new(
        Arc::new(transport()),
        Arc::new(TokioSleeper::new()),
        Arc::new(SystemClock::new()),
    );
    let specs = vec![
        RequestSpec::get(format!("{}/jobs/1", server.uri()))
            .named("job")
            .with_retries(PredicateKind::BodyIncludes, "done", 4, 10)
            .with_validation(PredicateKind::StatusCodeEquals, "200"),
    ];

    let output = engine.run(&specs).await.unwrap();

    assert_eq!(output.report.outcome, Outcome::Pass);
    assert_eq!(
        output.report.specs[0].retry,
        RetryState::Satisfied { attempt: 3 }
    );
    assert_eq!(output.context.get("job").unwrap().body, "state: done");
}
