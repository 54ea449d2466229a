// Inbound record dispatch and wiring of buffers, hierarchy and reporters

use crate::buffer::DeltaBuffer;
use crate::config::{OutputConfig, TopicConfig};
use crate::graph::GraphError;
use crate::hierarchy::Hierarchy;
use crate::model::{InboundRecord, Item, ObjectDeleted, Station, Unit, UnitConnection};
use crate::reconcile::{ConnectionQueue, ConnectionReconciler};
use crate::report::{BatchSink, GroupReporter, ItemReporter, StationReporter, UnitReporter};
use crate::scheduler::Scheduler;
use crate::state::EntityStore;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, error, info};

#[cfg(test)]
mod tests;

/// Converts the inbound entity stream into windowed GeoJSON reports
///
/// The ingest path only mutates in-memory structures; rendering and
/// publication happen in the loops started by [`Gateway::start`], each of
/// which receives only the buffers it flushes.
pub struct Gateway {
    store: Arc<EntityStore>,
    hierarchy: Arc<Hierarchy>,
    connections: Arc<ConnectionQueue>,

    item_updates: Arc<DeltaBuffer<Item>>,
    unit_updates: Arc<DeltaBuffer<Unit>>,
    station_updates: Arc<DeltaBuffer<Station>>,

    /// Notified when the item buffer reaches the flush threshold
    item_wake: Arc<Notify>,

    /// Notified when the station buffer reaches the flush threshold
    station_wake: Arc<Notify>,

    config: OutputConfig,
}

impl Gateway {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            store: Arc::new(EntityStore::new()),
            hierarchy: Arc::new(Hierarchy::new()),
            connections: Arc::new(ConnectionQueue::new(config.connection_max_attempts)),
            item_updates: Arc::new(DeltaBuffer::new()),
            unit_updates: Arc::new(DeltaBuffer::new()),
            station_updates: Arc::new(DeltaBuffer::new()),
            item_wake: Arc::new(Notify::new()),
            station_wake: Arc::new(Notify::new()),
            config,
        }
    }

    /// Apply one inbound record
    pub fn handle_record(&self, record: InboundRecord) {
        match record {
            InboundRecord::Item(item) => self.process_item(item),
            InboundRecord::Unit(unit) => self.process_unit(unit),
            InboundRecord::Connection(connection) => self.process_connection(connection),
            InboundRecord::Deletion(deletion) => self.process_deletion(deletion),
            InboundRecord::Station(station) => self.process_station(station),
        }
    }

    fn process_item(&self, item: Item) {
        self.store.record_item(item.clone());

        let unit = self.store.unit_for_main_item(&item.guid);

        if item.is_reportable() {
            let pending = self.item_updates.insert(item.guid.clone(), item);
            if pending >= self.config.flush_threshold {
                self.item_wake.notify_one();
            }
        }

        if let Some(unit) = unit {
            self.unit_updates.insert(unit.guid.clone(), unit.clone());
            if self.hierarchy.mark_if_root(&unit) {
                debug!(unit = %unit.guid, "Main item moved, group marked for report");
            }
        }
    }

    fn process_unit(&self, unit: Unit) {
        self.store.record_unit(unit.clone());
        self.hierarchy.add_unit(&unit.guid);
        self.unit_updates.insert(unit.guid.clone(), unit);
    }

    fn process_connection(&self, connection: UnitConnection) {
        info!(
            connection = %connection.guid,
            parent = %connection.parent_unit,
            child = %connection.child_unit,
            "Received unit connection"
        );
        self.connections.push(connection);
    }

    fn process_deletion(&self, deletion: ObjectDeleted) {
        match self.hierarchy.disconnect(&deletion.guid, &self.store) {
            Ok(edge) => {
                info!(
                    connection = %deletion.guid,
                    parent = %edge.parent,
                    child = %edge.child,
                    "Removed unit connection"
                );
            }
            Err(GraphError::UnknownConnection(_)) if self.connections.remove(&deletion.guid) => {
                info!(
                    connection = %deletion.guid,
                    "Removed unit connection before it was reconciled"
                );
            }
            Err(e) => {
                error!(guid = %deletion.guid, error = %e, "Cannot remove connection");
            }
        }
    }

    fn process_station(&self, station: Station) {
        if !station.visible_for_participant {
            return;
        }
        let pending = self.station_updates.insert(station.guid.clone(), station);
        if pending >= self.config.flush_threshold {
            self.station_wake.notify_one();
        }
    }

    /// Spawn one reporting loop per output kind plus the reconciliation loop
    pub fn start(&self, sink: Arc<dyn BatchSink>, topics: &TopicConfig) -> Scheduler {
        let period = self.config.period();
        let mut scheduler = Scheduler::new();

        scheduler.spawn_reporter(
            Arc::new(ItemReporter::new(self.item_updates.clone())),
            sink.clone(),
            topics.output_item.clone(),
            period,
            Some(self.item_wake.clone()),
        );
        scheduler.spawn_reporter(
            Arc::new(UnitReporter::new(
                self.unit_updates.clone(),
                self.store.clone(),
            )),
            sink.clone(),
            topics.output_unit.clone(),
            period,
            None,
        );
        scheduler.spawn_reporter(
            Arc::new(GroupReporter::new(
                self.hierarchy.clone(),
                self.store.clone(),
            )),
            sink.clone(),
            topics.output_group.clone(),
            period,
            None,
        );
        scheduler.spawn_reporter(
            Arc::new(StationReporter::new(self.station_updates.clone())),
            sink,
            topics.output_station.clone(),
            period,
            Some(self.station_wake.clone()),
        );
        scheduler.spawn_reconciler(Arc::new(self.reconciler()), period);

        info!(
            frequency_ms = self.config.frequency_ms,
            flush_threshold = self.config.flush_threshold,
            "Start converting items, units, groups and stations to GeoJSON (windowed)"
        );

        scheduler
    }

    pub fn item_reporter(&self) -> ItemReporter {
        ItemReporter::new(self.item_updates.clone())
    }

    pub fn unit_reporter(&self) -> UnitReporter {
        UnitReporter::new(self.unit_updates.clone(), self.store.clone())
    }

    pub fn group_reporter(&self) -> GroupReporter {
        GroupReporter::new(self.hierarchy.clone(), self.store.clone())
    }

    pub fn station_reporter(&self) -> StationReporter {
        StationReporter::new(self.station_updates.clone())
    }

    pub fn reconciler(&self) -> ConnectionReconciler {
        ConnectionReconciler::new(
            self.connections.clone(),
            self.hierarchy.clone(),
            self.store.clone(),
        )
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn pending_items(&self) -> usize {
        self.item_updates.len()
    }

    pub fn pending_units(&self) -> usize {
        self.unit_updates.len()
    }

    pub fn pending_stations(&self) -> usize {
        self.station_updates.len()
    }

    pub fn pending_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn item_wake(&self) -> Arc<Notify> {
        self.item_wake.clone()
    }

    pub fn station_wake(&self) -> Arc<Notify> {
        self.station_wake.clone()
    }
}
