// Shared fixtures for unit tests

use crate::model::{
    Item, ItemType, Location, ScenarioLabel, Station, Unit, UnitConnection, VehicleSubType,
    Velocity,
};

pub fn rescue_item(guid: &str, sub_label: &str) -> Item {
    Item {
        guid: guid.to_string(),
        name: format!("{} name", guid),
        owner: "XVR.RM".to_string(),
        location: Location {
            latitude: 52.171,
            longitude: 21.201,
            altitude: 0.0,
        },
        velocity: Velocity {
            yaw: 0.0,
            pitch: 0.0,
            magnitude: 3.5,
        },
        orientation: Default::default(),
        visible_for_participant: true,
        movable: true,
        scenario_label: Some(ScenarioLabel::Rescue {
            sub_label: sub_label.to_string(),
        }),
        item_type: Some(ItemType::Vehicle {
            sub_type: VehicleSubType::Car,
        }),
    }
}

pub fn incident_item(guid: &str) -> Item {
    Item {
        scenario_label: Some(ScenarioLabel::Incident {
            sub_label: "FIRE".to_string(),
        }),
        ..rescue_item(guid, "UNUSED")
    }
}

pub fn unit(guid: &str, main_item: &str) -> Unit {
    Unit {
        guid: guid.to_string(),
        name: guid.to_uppercase(),
        main_item: main_item.to_string(),
        sub_items: Vec::new(),
    }
}

pub fn connection(guid: &str, parent: &str, child: &str) -> UnitConnection {
    UnitConnection {
        guid: guid.to_string(),
        parent_unit: parent.to_string(),
        child_unit: child.to_string(),
    }
}

pub fn station(guid: &str, visible: bool) -> Station {
    Station {
        guid: guid.to_string(),
        name: format!("{} station", guid),
        location: Location {
            latitude: 51.0,
            longitude: 4.0,
            altitude: 10.0,
        },
        scenario_label: "POLICE".to_string(),
        visible_for_participant: visible,
        items: vec!["car-1".to_string(), "car-2".to_string()],
    }
}
