use dh_sse::{GatewayTransport, HttpGateway, OutboundEvent, SendOutcome};

use std::time::Duration;

use googletest::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event() -> OutboundEvent {
    OutboundEvent {
        name: "tab_status".to_string(),
        data: r#"{"tab_index":0}"#.to_string(),
    }
}

async fn gateway_for(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&format!("{}/", server.uri()), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn given_gateway_accepts_when_sent_then_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/send"))
        .and(body_json(json!({
            "token": "tok-1",
            "event": { "name": "tab_status", "data": "{\"tab_index\":0}" },
            "close": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway_for(&server).await.send("tok-1", &event()).await;

    assert_that!(outcome, eq(&SendOutcome::Delivered));
}

#[tokio::test]
async fn given_unknown_token_when_sent_then_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/send"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = gateway_for(&server).await.send("gone", &event()).await;

    assert_that!(outcome, eq(&SendOutcome::NotFound));
}

#[tokio::test]
async fn given_gateway_error_when_sent_then_rejected_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/send"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let outcome = gateway_for(&server).await.send("tok-1", &event()).await;

    assert_that!(outcome, eq(&SendOutcome::Rejected(503)));
}

#[tokio::test]
async fn given_close_when_sent_then_body_has_no_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/send"))
        .and(body_json(json!({ "token": "tok-1", "close": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway_for(&server).await.close("tok-1").await;

    assert!(outcome.is_delivered());
}

#[tokio::test]
async fn given_nothing_listening_when_sent_then_unreachable() {
    let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

    let outcome = gateway.send("tok-1", &event()).await;

    assert!(matches!(outcome, SendOutcome::Unreachable(_)));
}
