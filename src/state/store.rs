use crate::model::{Item, Unit};
use dashmap::DashMap;

/// Entity store holding the authoritative latest state per guid
///
/// Each map is an independent `DashMap`; no method holds a shard guard
/// after it returns, so the store may be read from inside the hierarchy
/// guard without ordering concerns.
pub struct EntityStore {
    /// Items by guid
    items: DashMap<String, Item>,

    /// Units by guid
    units: DashMap<String, Unit>,

    /// Main item guid -> unit guid
    main_items: DashMap<String, String>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            units: DashMap::new(),
            main_items: DashMap::new(),
        }
    }

    /// Replace the stored item, returning the previous state
    pub fn record_item(&self, item: Item) -> Option<Item> {
        self.items.insert(item.guid.clone(), item)
    }

    /// Replace the stored unit and index it by its main item
    ///
    /// If the unit previously declared a different main item, the stale
    /// index entry is dropped as long as it still points at this unit.
    pub fn record_unit(&self, unit: Unit) -> Option<Unit> {
        let guid = unit.guid.clone();
        let main_item = unit.main_item.clone();
        let previous = self.units.insert(guid.clone(), unit);

        if let Some(prev) = &previous {
            if prev.main_item != main_item {
                self.main_items
                    .remove_if(&prev.main_item, |_, owner| owner == &guid);
            }
        }
        self.main_items.insert(main_item, guid);

        previous
    }

    pub fn item(&self, guid: &str) -> Option<Item> {
        self.items.get(guid).map(|item| item.clone())
    }

    pub fn unit(&self, guid: &str) -> Option<Unit> {
        self.units.get(guid).map(|unit| unit.clone())
    }

    /// Unit whose declared main item is `item_guid`
    pub fn unit_for_main_item(&self, item_guid: &str) -> Option<Unit> {
        let unit_guid = self.main_items.get(item_guid).map(|guid| guid.clone())?;
        self.unit(&unit_guid)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
