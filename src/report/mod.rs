// Rendering of delta buffers into output batches, one reporter per output kind

mod sink;

pub use sink::{BatchSink, MemorySink};

use crate::buffer::DeltaBuffer;
use crate::feature::{self, Feature, FeatureCollection};
use crate::hierarchy::Hierarchy;
use crate::model::{Item, Station, Unit};
use crate::state::EntityStore;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Output channel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Item,
    Unit,
    Group,
    Station,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Item => write!(f, "item"),
            OutputKind::Unit => write!(f, "unit"),
            OutputKind::Group => write!(f, "group"),
            OutputKind::Station => write!(f, "station"),
        }
    }
}

/// Turns one delta buffer into a batch
///
/// `collect` drains the buffer; entries that cannot be rendered yet are put
/// back for the next window. Returns `None` when there is nothing to publish.
pub trait Reporter: Send + Sync {
    fn kind(&self) -> OutputKind;

    fn collect(&self) -> Option<FeatureCollection>;
}

fn batch(features: Vec<Feature>) -> Option<FeatureCollection> {
    if features.is_empty() {
        None
    } else {
        Some(FeatureCollection::new(features))
    }
}

/// Items carry everything needed to render, so the buffer always empties
pub struct ItemReporter {
    buffer: Arc<DeltaBuffer<Item>>,
}

impl ItemReporter {
    pub fn new(buffer: Arc<DeltaBuffer<Item>>) -> Self {
        Self { buffer }
    }
}

impl Reporter for ItemReporter {
    fn kind(&self) -> OutputKind {
        OutputKind::Item
    }

    fn collect(&self) -> Option<FeatureCollection> {
        let features = self
            .buffer
            .drain()
            .iter()
            .map(|(_, item)| feature::item_feature(item))
            .collect();
        batch(features)
    }
}

/// Units render at their main item; units whose main item is unknown wait
pub struct UnitReporter {
    buffer: Arc<DeltaBuffer<Unit>>,
    store: Arc<EntityStore>,
}

impl UnitReporter {
    pub fn new(buffer: Arc<DeltaBuffer<Unit>>, store: Arc<EntityStore>) -> Self {
        Self { buffer, store }
    }
}

impl Reporter for UnitReporter {
    fn kind(&self) -> OutputKind {
        OutputKind::Unit
    }

    fn collect(&self) -> Option<FeatureCollection> {
        let mut features = Vec::new();
        let mut deferred = Vec::new();

        for (guid, unit) in self.buffer.drain() {
            match self.store.item(&unit.main_item) {
                Some(main_item) => features.push(feature::unit_feature(&unit, &main_item)),
                None => {
                    debug!(
                        unit = %guid,
                        main_item = %unit.main_item,
                        "Unable to report unit, main item not known. Trying again later"
                    );
                    deferred.push((guid, unit));
                }
            }
        }

        self.buffer.defer(deferred);
        batch(features)
    }
}

/// Groups are rooted units with descendants, positioned at the root's main item
pub struct GroupReporter {
    hierarchy: Arc<Hierarchy>,
    store: Arc<EntityStore>,
}

impl GroupReporter {
    pub fn new(hierarchy: Arc<Hierarchy>, store: Arc<EntityStore>) -> Self {
        Self { hierarchy, store }
    }
}

impl Reporter for GroupReporter {
    fn kind(&self) -> OutputKind {
        OutputKind::Group
    }

    fn collect(&self) -> Option<FeatureCollection> {
        let mut features = Vec::new();
        let mut deferred = Vec::new();

        for group in self.hierarchy.drain_groups() {
            match self.store.item(&group.root.main_item) {
                Some(main_item) => features.push(feature::group_feature(
                    &group.root,
                    &main_item,
                    &group.group_id,
                    group.members,
                )),
                None => {
                    debug!(
                        root = %group.root.guid,
                        main_item = %group.root.main_item,
                        "Unable to report group, main item of root unit not known. Trying again later"
                    );
                    deferred.push(group.root);
                }
            }
        }

        self.hierarchy.defer_groups(deferred);
        batch(features)
    }
}

pub struct StationReporter {
    buffer: Arc<DeltaBuffer<Station>>,
}

impl StationReporter {
    pub fn new(buffer: Arc<DeltaBuffer<Station>>) -> Self {
        Self { buffer }
    }
}

impl Reporter for StationReporter {
    fn kind(&self) -> OutputKind {
        OutputKind::Station
    }

    fn collect(&self) -> Option<FeatureCollection> {
        let features = self
            .buffer
            .drain()
            .iter()
            .map(|(_, station)| feature::station_feature(station))
            .collect();
        batch(features)
    }
}
