use serde::{Deserialize, Serialize};


/// Geographic position (WGS84 degrees, altitude in metres)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    /// Speed in metres per second
    #[serde(default)]
    pub magnitude: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

/// Scenario classification of an item
///
/// Only rescue labels are reported on the item/unit/group outputs; the
/// sub-label (e.g. "POLICE", "AMBULANCE") becomes the feature label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioLabel {
    Rescue {
        #[serde(rename = "subLabel")]
        sub_label: String,
    },
    Incident {
        #[serde(rename = "subLabel")]
        sub_label: String,
    },
    Environment {
        #[serde(rename = "subLabel")]
        sub_label: String,
    },
    /// Any classification this gateway does not know
    #[serde(other)]
    Unknown,
}

impl ScenarioLabel {
    /// Sub-label of a rescue classification, `None` for any other label
    pub fn rescue_sub_label(&self) -> Option<&str> {
        match self {
            ScenarioLabel::Rescue { sub_label } => Some(sub_label),
            _ => None,
        }
    }
}

/// Declared sub-kind of a vehicle item
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleSubType {
    Boat,
    Car,
    Helicopter,
    Motorcycle,
    Plane,
    Truck,
    Van,
    #[default]
    #[serde(other)]
    Other,
}

/// Physical kind of an item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Object {
        #[serde(rename = "subType", default)]
        sub_type: Option<String>,
    },
    Vehicle {
        #[serde(rename = "subType", default)]
        sub_type: VehicleSubType,
    },
    Person {
        #[serde(default)]
        gender: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// A mobile scenario item (vehicle, person, object)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    pub location: Location,
    #[serde(default)]
    pub velocity: Velocity,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub visible_for_participant: bool,
    #[serde(default)]
    pub movable: bool,
    #[serde(default)]
    pub scenario_label: Option<ScenarioLabel>,
    #[serde(default)]
    pub item_type: Option<ItemType>,
}

impl Item {
    pub fn rescue_sub_label(&self) -> Option<&str> {
        self.scenario_label
            .as_ref()
            .and_then(ScenarioLabel::rescue_sub_label)
    }

    /// Items are reported on the item output only when participants may see
    /// them and they belong to the rescue side of the scenario.
    pub fn is_reportable(&self) -> bool {
        self.visible_for_participant && self.rescue_sub_label().is_some()
    }
}

/// An organizational unit, positioned through its main item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub guid: String,
    pub name: String,
    pub main_item: String,
    #[serde(default)]
    pub sub_items: Vec<String>,
}

/// Directed parent -> child edge between two units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConnection {
    pub guid: String,
    #[serde(alias = "mainUnit")]
    pub parent_unit: String,
    #[serde(alias = "subUnit")]
    pub child_unit: String,
}

/// Removal notice for a previously announced object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDeleted {
    pub guid: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub guid: String,
    pub name: String,
    pub location: Location,
    pub scenario_label: String,
    #[serde(default)]
    pub visible_for_participant: bool,
    #[serde(default)]
    pub items: Vec<String>,
}

/// One decoded record delivered by the message bus, discriminated by `kind`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundRecord {
    Item(Item),
    Unit(Unit),
    Connection(UnitConnection),
    Deletion(ObjectDeleted),
    Station(Station),
}

impl InboundRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundRecord::Item(_) => "item",
            InboundRecord::Unit(_) => "unit",
            InboundRecord::Connection(_) => "connection",
            InboundRecord::Deletion(_) => "deletion",
            InboundRecord::Station(_) => "station",
        }
    }

    pub fn guid(&self) -> &str {
        match self {
            InboundRecord::Item(item) => &item.guid,
            InboundRecord::Unit(unit) => &unit.guid,
            InboundRecord::Connection(connection) => &connection.guid,
            InboundRecord::Deletion(deletion) => &deletion.guid,
            InboundRecord::Station(station) => &station.guid,
        }
    }
}
