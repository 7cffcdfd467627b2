use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::Arc};

use crate::records::{BusRecord, BusStatus};

/// Visual classification of a bus status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusVariant {
    Success,
    Warning,
    Error,
    #[default]
    Base,
}

impl StatusVariant {
    /// Unknown and missing statuses fall back to [`StatusVariant::Base`].
    pub fn classify(status: Option<&BusStatus>) -> Self {
        match status {
            Some(BusStatus::Available) => StatusVariant::Success,
            Some(BusStatus::LimitedSeats) => StatusVariant::Warning,
            Some(BusStatus::Full) => StatusVariant::Error,
            Some(BusStatus::Other(_)) | None => StatusVariant::Base,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusVariant::Success => "success",
            StatusVariant::Warning => "warning",
            StatusVariant::Error => "error",
            StatusVariant::Base => "base",
        }
    }
}

impl Display for StatusVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Icon shown next to the passenger list toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListIcon {
    #[default]
    #[serde(rename = "utility:chevronright")]
    Collapsed,
    #[serde(rename = "utility:chevrondown")]
    Expanded,
}

impl ListIcon {
    pub fn for_state(show_passengers: bool) -> Self {
        if show_passengers {
            ListIcon::Expanded
        } else {
            ListIcon::Collapsed
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ListIcon::Collapsed => "utility:chevronright",
            ListIcon::Expanded => "utility:chevrondown",
        }
    }
}

impl Display for ListIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Width hint for the occupancy bar. Always within `0..=100`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProgressStyle(u32);

impl ProgressStyle {
    pub const fn from_occupancy(occupancy_percentage: u32) -> Self {
        if occupancy_percentage > 100 {
            Self(100)
        } else {
            Self(occupancy_percentage)
        }
    }

    pub const fn width(&self) -> u32 {
        self.0
    }
}

impl Display for ProgressStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "width: {}%", self.0)
    }
}

impl From<ProgressStyle> for String {
    fn from(value: ProgressStyle) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ProgressStyle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("width: ")
            .and_then(|rest| rest.strip_suffix('%'))
            .and_then(|width| width.trim().parse::<u32>().ok())
            .map(Self::from_occupancy)
            .ok_or_else(|| format!("invalid progress style: {value}"))
    }
}

/// A bus ready to be rendered: the original record plus everything derived from it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedBusView {
    #[serde(flatten)]
    pub record: BusRecord,
    pub passenger_count: u32,
    /// Not clamped. An overbooked bus reports more than 100.
    pub occupancy_percentage: u32,
    pub has_passengers: bool,
    pub show_passengers: bool,
    pub passenger_list_label: String,
    pub passenger_list_icon: ListIcon,
    pub status_variant: StatusVariant,
    pub progress_style: ProgressStyle,
}

impl DerivedBusView {
    pub fn id(&self) -> &Arc<str> {
        &self.record.id
    }

    /// Changes the expansion flag and the two fields that depend on it.
    /// Numeric fields are left alone.
    pub fn set_show_passengers(&mut self, show_passengers: bool) {
        self.show_passengers = show_passengers;
        self.passenger_list_label = list_label(show_passengers, self.passenger_count);
        self.passenger_list_icon = ListIcon::for_state(show_passengers);
    }

    pub fn toggle(&mut self) {
        self.set_show_passengers(!self.show_passengers);
    }
}

pub(crate) fn list_label(show_passengers: bool, passenger_count: u32) -> String {
    if show_passengers {
        format!("Hide Passengers ({passenger_count})")
    } else {
        format!("View Passengers ({passenger_count})")
    }
}
