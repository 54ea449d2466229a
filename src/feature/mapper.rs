use super::{EntityProperties, Feature, FeatureType, Point, PointType, TypeEnum};
use crate::model::{Item, ItemType, Location, Station, Unit, VehicleSubType};
use tracing::warn;

/// Label used when an entity carries no rescue classification
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

pub fn point(location: &Location) -> Point {
    Point {
        kind: PointType::Point,
        coordinates: [location.longitude, location.latitude, location.altitude],
    }
}

/// Map an item's physical kind onto the output type vocabulary
pub fn item_type(item_type: Option<&ItemType>) -> TypeEnum {
    match item_type {
        Some(ItemType::Object { .. }) => TypeEnum::Object,
        Some(ItemType::Person { .. }) => TypeEnum::Person,
        Some(ItemType::Vehicle { sub_type }) => match sub_type {
            VehicleSubType::Boat => TypeEnum::Boat,
            VehicleSubType::Car => TypeEnum::Car,
            VehicleSubType::Helicopter => TypeEnum::Helicopter,
            VehicleSubType::Motorcycle => TypeEnum::Motorcycle,
            VehicleSubType::Plane => TypeEnum::Plane,
            VehicleSubType::Truck => TypeEnum::Truck,
            VehicleSubType::Van => TypeEnum::Van,
            VehicleSubType::Other => TypeEnum::Unknown,
        },
        Some(ItemType::Unknown) | None => TypeEnum::Unknown,
    }
}

pub fn item_feature(item: &Item) -> Feature {
    let label = item.rescue_sub_label().unwrap_or(UNKNOWN_LABEL);

    Feature {
        kind: FeatureType::Feature,
        geometry: point(&item.location),
        properties: EntityProperties {
            guid: item.guid.clone(),
            name: item.name.clone(),
            entity_type: item_type(item.item_type.as_ref()),
            label: label.to_string(),
            speed: Some(item.velocity.magnitude),
            sub_entities: None,
        },
    }
}

/// Render a unit at its main item's position
///
/// Sub-entities list the main item first, followed by the unit's declared
/// sub-items.
pub fn unit_feature(unit: &Unit, main_item: &Item) -> Feature {
    let mut sub_entities = Vec::with_capacity(unit.sub_items.len() + 1);
    sub_entities.push(main_item.guid.clone());
    sub_entities.extend(unit.sub_items.iter().cloned());

    Feature {
        kind: FeatureType::Feature,
        geometry: point(&main_item.location),
        properties: EntityProperties {
            guid: unit.guid.clone(),
            name: unit.name.clone(),
            entity_type: TypeEnum::Unit,
            label: rescue_label(main_item, "Unit", &unit.guid),
            speed: None,
            sub_entities: Some(sub_entities),
        },
    }
}

/// Render a synthetic group rooted at `root`, positioned at the root's main item
pub fn group_feature(root: &Unit, main_item: &Item, group_id: &str, members: Vec<String>) -> Feature {
    Feature {
        kind: FeatureType::Feature,
        geometry: point(&main_item.location),
        properties: EntityProperties {
            guid: group_id.to_string(),
            name: format!("{}-group", root.name),
            entity_type: TypeEnum::UnitGroup,
            label: rescue_label(main_item, "Group", group_id),
            speed: None,
            sub_entities: Some(members),
        },
    }
}

pub fn station_feature(station: &Station) -> Feature {
    Feature {
        kind: FeatureType::Feature,
        geometry: point(&station.location),
        properties: EntityProperties {
            guid: station.guid.clone(),
            name: station.name.clone(),
            entity_type: TypeEnum::Station,
            label: station.scenario_label.clone(),
            speed: None,
            sub_entities: Some(station.items.clone()),
        },
    }
}

fn rescue_label(main_item: &Item, owner_kind: &str, owner_guid: &str) -> String {
    match main_item.rescue_sub_label() {
        Some(label) => label.to_string(),
        None => {
            warn!(
                owner = owner_kind,
                guid = %owner_guid,
                main_item = %main_item.guid,
                "Main item is not of type rescue, reporting label UNKNOWN"
            );
            UNKNOWN_LABEL.to_string()
        }
    }
}
