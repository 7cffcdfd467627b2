use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, sync::Arc};

/// Fields the upstream sends that this crate does not interpret.
pub type Passthrough = Map<String, Value>;

/// A single passenger riding a bus.
/// Only its presence matters for occupancy, the rest is carried along for display.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    #[serde(rename = "Id", default)]
    pub id: Arc<str>,
    #[serde(flatten)]
    pub fields: Passthrough,
}

/// Operating status reported for a bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BusStatus {
    Available,
    LimitedSeats,
    Full,
    /// Any status code this crate does not know about yet.
    Other(Arc<str>),
}

impl BusStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BusStatus::Available => "Available",
            BusStatus::LimitedSeats => "Limited Seats",
            BusStatus::Full => "Full",
            BusStatus::Other(code) => code,
        }
    }
}

impl From<&str> for BusStatus {
    fn from(value: &str) -> Self {
        match value {
            "Available" => BusStatus::Available,
            "Limited Seats" => BusStatus::LimitedSeats,
            "Full" => BusStatus::Full,
            other => BusStatus::Other(other.into()),
        }
    }
}

impl From<String> for BusStatus {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<BusStatus> for String {
    fn from(value: BusStatus) -> Self {
        value.as_str().to_string()
    }
}

impl Display for BusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bus as delivered by the upstream, with its passengers nested inside.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRecord {
    /// Unique and stable across refreshes.
    #[serde(rename = "Id")]
    pub id: Arc<str>,
    #[serde(
        rename = "Bus_Status__c",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<BusStatus>,
    /// `None` when the upstream omits the relation, which happens for buses without passengers.
    #[serde(
        rename = "Passengers__r",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub passengers: Option<Vec<PassengerRecord>>,
    #[serde(flatten)]
    pub fields: Passthrough,
}

impl BusRecord {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<BusStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_passengers(mut self, passengers: Vec<PassengerRecord>) -> Self {
        self.passengers = Some(passengers);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.as_ref().map_or(0, Vec::len)
    }
}

/// The bus company a dashboard is scoped to.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "Id")]
    pub id: Arc<str>,
    #[serde(rename = "Name")]
    pub name: Arc<str>,
}
