use super::*;
use crate::testing::{connection, incident_item, rescue_item, station, unit};
use crate::report::Reporter;
use std::time::Duration;
use tokio::time::timeout;

fn gateway_with_threshold(flush_threshold: usize) -> Gateway {
    Gateway::new(OutputConfig {
        frequency_ms: 1000,
        flush_threshold,
        connection_max_attempts: 0,
    })
}

#[test]
fn test_only_visible_rescue_items_are_buffered() {
    let gateway = gateway_with_threshold(100);

    gateway.handle_record(InboundRecord::Item(rescue_item("car-1", "POLICE")));
    gateway.handle_record(InboundRecord::Item(incident_item("fire-1")));
    let mut hidden = rescue_item("car-2", "POLICE");
    hidden.visible_for_participant = false;
    gateway.handle_record(InboundRecord::Item(hidden));

    assert_eq!(gateway.pending_items(), 1);
    // Every item still updates the store
    assert_eq!(gateway.store().item_count(), 3);
}

#[test]
fn test_unit_registers_in_store_graph_and_buffer() {
    let gateway = gateway_with_threshold(100);

    gateway.handle_record(InboundRecord::Unit(unit("unit-a", "item-a")));

    assert!(gateway.store().unit("unit-a").is_some());
    assert!(gateway.hierarchy().has_unit("unit-a"));
    assert_eq!(gateway.pending_units(), 1);
}

#[test]
fn test_main_item_update_marks_unit_dirty() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("unit-a", "item-a")));
    gateway.handle_record(InboundRecord::Item(incident_item("item-a")));
    gateway.unit_reporter().collect().unwrap();
    assert_eq!(gateway.pending_units(), 0);

    // Non-rescue main items still move their unit
    gateway.handle_record(InboundRecord::Item(incident_item("item-a")));

    assert_eq!(gateway.pending_units(), 1);
    assert_eq!(gateway.pending_items(), 0);
}

#[test]
fn test_connection_is_queued_until_reconciled() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));

    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));

    assert_eq!(gateway.pending_connections(), 1);
    assert!(!gateway.hierarchy().has_connection("c1"));

    gateway.reconciler().run_cycle();

    assert_eq!(gateway.pending_connections(), 0);
    assert!(gateway.hierarchy().has_connection("c1"));
    assert!(gateway.hierarchy().is_group_root("a"));
}

#[test]
fn test_root_main_item_update_marks_group() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));
    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));
    gateway.reconciler().run_cycle();
    gateway.handle_record(InboundRecord::Item(rescue_item("ia", "POLICE")));
    gateway.group_reporter().collect().unwrap();
    assert_eq!(gateway.hierarchy().pending_group_count(), 0);

    gateway.handle_record(InboundRecord::Item(rescue_item("ia", "POLICE")));
    assert_eq!(gateway.hierarchy().pending_group_count(), 1);

    // Child main items do not mark a group
    gateway.group_reporter().collect();
    gateway.handle_record(InboundRecord::Item(rescue_item("ib", "POLICE")));
    assert_eq!(gateway.hierarchy().pending_group_count(), 0);
}

#[test]
fn test_deletion_of_unknown_connection_changes_nothing() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));
    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));
    gateway.reconciler().run_cycle();
    gateway.group_reporter().collect();

    gateway.handle_record(InboundRecord::Deletion(ObjectDeleted {
        guid: "never-added".to_string(),
    }));

    assert!(gateway.hierarchy().has_connection("c1"));
    assert_eq!(gateway.hierarchy().descendants_of("a"), vec!["b"]);
    assert_eq!(gateway.hierarchy().pending_group_count(), 1);
}

#[test]
fn test_deletion_removes_connection() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));
    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));
    gateway.reconciler().run_cycle();

    gateway.handle_record(InboundRecord::Deletion(ObjectDeleted {
        guid: "c1".to_string(),
    }));

    assert!(!gateway.hierarchy().has_connection("c1"));
    assert!(gateway.hierarchy().descendants_of("a").is_empty());
}

#[test]
fn test_invisible_station_is_ignored() {
    let gateway = gateway_with_threshold(100);

    gateway.handle_record(InboundRecord::Station(station("s-1", false)));
    gateway.handle_record(InboundRecord::Station(station("s-2", true)));

    assert_eq!(gateway.pending_stations(), 1);
    assert_eq!(gateway.station_reporter().collect().unwrap().len(), 1);
}

#[tokio::test]
async fn test_item_threshold_notifies_flush() {
    let gateway = gateway_with_threshold(3);
    let wake = gateway.item_wake();

    gateway.handle_record(InboundRecord::Item(rescue_item("car-1", "POLICE")));
    gateway.handle_record(InboundRecord::Item(rescue_item("car-2", "POLICE")));
    assert!(timeout(Duration::from_millis(20), wake.notified())
        .await
        .is_err());

    gateway.handle_record(InboundRecord::Item(rescue_item("car-3", "POLICE")));
    assert!(timeout(Duration::from_millis(20), wake.notified())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_station_threshold_notifies_flush() {
    let gateway = gateway_with_threshold(2);
    let wake = gateway.station_wake();

    gateway.handle_record(InboundRecord::Station(station("s-1", true)));
    gateway.handle_record(InboundRecord::Station(station("s-2", true)));

    assert!(timeout(Duration::from_millis(20), wake.notified())
        .await
        .is_ok());
}

#[test]
fn test_deletion_cancels_queued_connection() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));
    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));

    // Deleted within the same window, before reconciliation
    gateway.handle_record(InboundRecord::Deletion(ObjectDeleted {
        guid: "c1".to_string(),
    }));
    assert_eq!(gateway.pending_connections(), 0);

    gateway.reconciler().run_cycle();

    assert!(!gateway.hierarchy().has_connection("c1"));
    assert!(gateway.hierarchy().descendants_of("a").is_empty());
    assert_eq!(gateway.hierarchy().pending_group_count(), 0);
}

#[test]
fn test_deletion_cancels_connection_waiting_for_units() {
    let gateway = gateway_with_threshold(100);
    gateway.handle_record(InboundRecord::Connection(connection("c1", "a", "b")));
    gateway.reconciler().run_cycle();
    assert_eq!(gateway.pending_connections(), 1);

    gateway.handle_record(InboundRecord::Deletion(ObjectDeleted {
        guid: "c1".to_string(),
    }));
    gateway.handle_record(InboundRecord::Unit(unit("a", "ia")));
    gateway.handle_record(InboundRecord::Unit(unit("b", "ib")));
    gateway.reconciler().run_cycle();

    assert!(!gateway.hierarchy().has_connection("c1"));
    assert!(gateway.hierarchy().descendants_of("a").is_empty());
}
