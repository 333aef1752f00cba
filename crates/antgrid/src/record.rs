use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

/// A collection of device records exposing the device control routes.
///
/// Identifiers are unique within a collection only: `ant/node-1` and
/// `spoke/node-1` are two distinct devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Sensor/actuator devices.
    Ant,
    /// Spoke nodes.
    Spoke,
}

impl Collection {
    /// All collections.
    pub const ALL: &[Self] = &[Self::Ant, Self::Spoke];

    /// Returns the collection name, which is also its route prefix.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ant => "ant",
            Self::Spoke => "spoke",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name().fmt(f)
    }
}

/// The kind of a node in the infrastructure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A sensor/actuator device attached to the network.
    #[default]
    Ant,
    /// A spoke node.
    Spoke,
    /// A hub node.
    Hub,
    /// A charging station.
    Charger,
    /// A hub acting as gateway towards other networks.
    GatewayHub,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ant => "Ant",
            Self::Spoke => "Spoke",
            Self::Hub => "Hub",
            Self::Charger => "Charger",
            Self::GatewayHub => "GatewayHub",
        }
        .fmt(f)
    }
}

/// Operational status of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalStatus {
    /// The node is in service.
    #[default]
    Active,
    /// The node is out of service.
    Inactive,
}

/// A latitude/longitude pair.
///
/// A missing value is serialized as `null`, so a coordinate lookup always
/// reports exactly what is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

impl Coordinate {
    /// Creates a [`Coordinate`] from known values.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// A persisted device record.
///
/// Records are read-only for the device control subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Unique identifier within its collection.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Node or asset type.
    #[serde(default)]
    pub node_type: NodeType,
    /// Country code, for example `us`.
    pub country_code: String,
    /// Operational status.
    pub status: OperationalStatus,
    /// Whether the node is under maintenance.
    #[serde(default)]
    pub in_maintenance: bool,
    /// Whether the node reported a warning.
    #[serde(default)]
    pub has_warning: bool,
    /// Stored latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Stored longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Coverage radius around the stored position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// When the node came online for the first time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_first_online: Option<DateTime<Utc>>,
    /// When the node was serviced for the last time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_last_serviced: Option<DateTime<Utc>>,
    /// Free-text history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    /// Firmware version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DeviceRecord {
    /// Creates an active [`DeviceRecord`] with only the mandatory fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: NodeType,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            node_type,
            country_code: country_code.into(),
            status: OperationalStatus::Active,
            in_maintenance: false,
            has_warning: false,
            latitude: None,
            longitude: None,
            radius: None,
            date_first_online: None,
            date_last_serviced: None,
            history: None,
            version: None,
        }
    }

    /// Sets the operational status.
    #[must_use]
    pub fn status(mut self, status: OperationalStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the stored position.
    #[must_use]
    pub fn position(mut self, coordinate: Coordinate) -> Self {
        self.latitude = coordinate.latitude;
        self.longitude = coordinate.longitude;
        self
    }

    /// Returns the stored position.
    ///
    /// This is a static field read, not a live query to the device.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Whether the record is in service.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OperationalStatus::Active
    }
}
