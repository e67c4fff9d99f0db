//! Integration tests for the restart endpoint
mod common;

use crate::common::{RESTARTABLE_TAB, STATIC_TAB, direct_app, json_body};

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use dh_core::{StatusPayload, StatusState};
use dh_server::{ApiSettings, build_router};
use googletest::prelude::*;
use tower::ServiceExt;

fn restart_request(index: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/restart/{index}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn given_restartable_tab_when_restart_posted_then_accepted_and_restarting() {
    let app = direct_app(ApiSettings::default());

    let response = build_router(app.state.clone())
        .oneshot(restart_request("1"))
        .await
        .unwrap();

    assert_that!(response.status(), eq(StatusCode::OK));
    let json = json_body(response).await;
    assert_eq!(json["status"], "restarting");
    assert_that!(
        app.state.store.current(RESTARTABLE_TAB).unwrap(),
        eq(&StatusPayload::restarting())
    );

    app.api.release.notify_one();
    assert!(
        app.state
            .orchestrator
            .wait_until_idle(Duration::from_secs(5))
            .await
    );
    assert_that!(
        app.state.store.current(RESTARTABLE_TAB).unwrap().state,
        eq(StatusState::Running)
    );
}

#[tokio::test]
async fn given_restart_in_flight_when_posted_again_then_409() {
    let app = direct_app(ApiSettings::default());
    let first = build_router(app.state.clone())
        .oneshot(restart_request("1"))
        .await
        .unwrap();
    assert_that!(first.status(), eq(StatusCode::OK));

    let second = build_router(app.state.clone())
        .oneshot(restart_request("1"))
        .await
        .unwrap();

    assert_that!(second.status(), eq(StatusCode::CONFLICT));
    let json = json_body(second).await;
    assert_eq!(json["error"]["code"], "RESTART_IN_PROGRESS");

    app.api.release.notify_one();
    assert!(
        app.state
            .orchestrator
            .wait_until_idle(Duration::from_secs(5))
            .await
    );
}

#[tokio::test]
async fn given_tab_without_deployment_when_restart_posted_then_400() {
    let app = direct_app(ApiSettings::default());

    let response = build_router(app.state.clone())
        .oneshot(restart_request(&STATIC_TAB.to_string()))
        .await
        .unwrap();

    assert_that!(response.status(), eq(StatusCode::BAD_REQUEST));
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "NOT_RESTARTABLE");
    assert_that!(
        app.state.store.current(STATIC_TAB).unwrap(),
        eq(&StatusPayload::running())
    );
}

#[tokio::test]
async fn given_unknown_tab_when_restart_posted_then_404() {
    let app = direct_app(ApiSettings::default());

    let response = build_router(app.state.clone())
        .oneshot(restart_request("42"))
        .await
        .unwrap();

    assert_that!(response.status(), eq(StatusCode::NOT_FOUND));
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_that!(app.state.orchestrator.in_flight_count(), eq(0));
}
