use super::FakeGateway;
use crate::{
    ConnectionRegistry, GatewayStatusTransport, OutboundEvent, Recipient, SseError, StatusStore,
    StatusTransport, TabStatusUpdate,
};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dh_core::{StatusPayload, StatusState};
use googletest::prelude::*;

/// Transport that records every delivery synchronously
#[derive(Default)]
struct RecordingTransport {
    deliveries: Mutex<Vec<(Recipient, TabStatusUpdate)>>,
}

impl StatusTransport for RecordingTransport {
    fn deliver(&self, recipient: Recipient, update: &TabStatusUpdate) {
        self.deliveries
            .lock()
            .unwrap()
            .push((recipient, update.clone()));
    }
}

#[test]
fn given_new_store_when_read_then_every_tab_is_running() {
    let store = StatusStore::new(3);

    for index in 0..3 {
        assert_that!(store.current(index).unwrap(), eq(&StatusPayload::running()));
    }
    assert_that!(store.tab_count(), eq(3));
}

#[test]
fn given_out_of_range_index_when_read_or_emitted_then_tab_not_found() {
    let store = StatusStore::new(1);

    assert!(matches!(
        store.current(5),
        Err(SseError::TabNotFound { index: 5, tab_count: 1, .. })
    ));
    assert!(matches!(
        store.emit(1, StatusPayload::restarting()),
        Err(SseError::TabNotFound { index: 1, .. })
    ));
    assert!(store.subscribe(9).is_err());
}

#[test]
fn given_several_emissions_when_read_then_latest_value_wins() {
    let store = StatusStore::new(2);

    store.emit(1, StatusPayload::restarting()).unwrap();
    store.emit(1, StatusPayload::error("boom")).unwrap();

    assert_that!(store.current(1).unwrap(), eq(&StatusPayload::error("boom")));
    assert_that!(store.current(0).unwrap(), eq(&StatusPayload::running()));
}

#[tokio::test]
async fn given_subscriber_after_emissions_when_attached_then_only_latest_is_replayed() {
    let store = StatusStore::new(1);
    store.emit(0, StatusPayload::restarting()).unwrap();
    store.emit(0, StatusPayload::error("halted")).unwrap();

    let mut sub = store.subscribe(0).unwrap();
    store.emit(0, StatusPayload::running()).unwrap();

    assert_that!(
        sub.next().await.unwrap().payload(),
        eq(&StatusPayload::error("halted"))
    );
    assert_that!(
        sub.next().await.unwrap().payload(),
        eq(&StatusPayload::running())
    );
}

#[tokio::test]
async fn given_subscriber_when_emitted_then_updates_arrive_in_order() {
    let store = StatusStore::new(1);
    let mut sub = store.subscribe(0).unwrap();

    store.emit(0, StatusPayload::restarting()).unwrap();
    store.emit(0, StatusPayload::running()).unwrap();

    let states: Vec<StatusState> = vec![
        sub.next().await.unwrap().state,
        sub.next().await.unwrap().state,
        sub.next().await.unwrap().state,
    ];
    assert_that!(
        states,
        eq(&vec![
            StatusState::Running,
            StatusState::Restarting,
            StatusState::Running
        ])
    );
}

#[test]
fn given_dropped_subscription_when_counted_then_detached() {
    let store = StatusStore::new(1);
    let sub = store.subscribe(0).unwrap();
    assert_that!(store.subscriber_count(), eq(1));

    drop(sub);

    assert_that!(store.subscriber_count(), eq(0));
}

#[test]
fn given_external_transport_when_emitted_then_broadcast_to_all() {
    let transport = Arc::new(RecordingTransport::default());
    let store = StatusStore::with_transport(2, transport.clone());

    store.emit(1, StatusPayload::restarting()).unwrap();

    let deliveries = transport.deliveries.lock().unwrap();
    assert_that!(deliveries.len(), eq(1));
    assert_that!(deliveries[0].0, eq(&Recipient::All));
    assert_that!(deliveries[0].1.tab_index, eq(1));
}

#[test]
fn given_external_transport_when_replayed_then_every_tab_sent_to_one_connection() {
    let transport = Arc::new(RecordingTransport::default());
    let store = StatusStore::with_transport(3, transport.clone());
    store.emit(2, StatusPayload::error("down")).unwrap();
    transport.deliveries.lock().unwrap().clear();

    store.replay_to("req-7");

    let deliveries = transport.deliveries.lock().unwrap();
    let indexes: Vec<usize> = deliveries.iter().map(|(_, u)| u.tab_index).collect();
    assert_that!(indexes, eq(&vec![0, 1, 2]));
    assert!(
        deliveries
            .iter()
            .all(|(r, _)| *r == Recipient::Connection("req-7".into()))
    );
    assert_that!(deliveries[2].1.state, eq(StatusState::Error));
}

#[test]
fn given_no_external_transport_when_replayed_then_nothing_happens() {
    let store = StatusStore::new(2);

    store.replay_to("req-1");

    assert_that!(store.subscriber_count(), eq(0));
}

async fn wait_for_events(gateway: &FakeGateway, count: usize) -> Vec<(String, OutboundEvent)> {
    for _ in 0..100 {
        let events = gateway.sent_events();
        if events.len() >= count {
            return events;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    gateway.sent_events()
}

#[tokio::test]
async fn given_gateway_transport_when_client_connects_then_current_state_replayed() {
    let gateway = Arc::new(FakeGateway::default());
    let registry = ConnectionRegistry::new(gateway.clone());
    let (transport, _dispatcher) = GatewayStatusTransport::spawn(registry.clone());
    let store = Arc::new(StatusStore::with_transport(2, Arc::new(transport)));
    store.attach_to_registry(&registry);
    store.emit(1, StatusPayload::restarting()).unwrap();
    // Let the dispatcher drain the broadcast while nobody is connected.
    tokio::time::sleep(Duration::from_millis(20)).await;

    registry.on_connect("req-1", "tok-1", "/events").await;

    let events = wait_for_events(&gateway, 2).await;
    assert_that!(events.len(), eq(2));
    assert!(events.iter().all(|(token, e)| token == "tok-1" && e.name == "tab_status"));
    assert_that!(
        events[0].1.data,
        eq(r#"{"tab_index":0,"state":"running","message":null}"#)
    );
    assert_that!(
        events[1].1.data,
        eq(r#"{"tab_index":1,"state":"restarting","message":null}"#)
    );
}

#[tokio::test]
async fn given_gateway_transport_when_emitted_then_events_sent_in_order() {
    let gateway = Arc::new(FakeGateway::default());
    let registry = ConnectionRegistry::new(gateway.clone());
    registry.on_connect("req-1", "tok-1", "/events").await;
    let (transport, _dispatcher) = GatewayStatusTransport::spawn(registry.clone());
    let store = StatusStore::with_transport(1, Arc::new(transport));

    store.emit(0, StatusPayload::restarting()).unwrap();
    store.emit(0, StatusPayload::error("failed")).unwrap();

    let events = wait_for_events(&gateway, 2).await;
    assert_that!(events.len(), eq(2));
    assert!(events[0].1.data.contains("restarting"));
    assert!(events[1].1.data.contains(r#""message":"failed""#));
}
