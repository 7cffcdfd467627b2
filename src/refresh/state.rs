use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    records::{BusRecord, Company},
    source::{Notification, Push},
    view::{self, DerivedBusView},
};

use super::Error;

/// Everything a dashboard shows, owned in one place.
/// Only the methods below change it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    views: Vec<DerivedBusView>,
    is_loading: bool,
    last_error: Option<String>,
    company: Option<Company>,
    refreshed_at: Option<DateTime<Local>>,
    refreshes_in_flight: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Starts in the loading state, waiting for the first push.
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            is_loading: true,
            last_error: None,
            company: None,
            refreshed_at: None,
            refreshes_in_flight: 0,
        }
    }

    pub fn views(&self) -> &[DerivedBusView] {
        &self.views
    }

    pub fn view(&self, bus_id: &str) -> Option<&DerivedBusView> {
        self.views.iter().find(|view| &**view.id() == bus_id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_buses(&self) -> bool {
        !self.views.is_empty()
    }

    pub fn company(&self) -> Option<&Company> {
        self.company.as_ref()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company.as_ref().map(|company| &*company.name)
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Local>> {
        self.refreshed_at
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshes_in_flight > 0
    }

    pub fn set_company(&mut self, company: Option<Company>) {
        self.company = company;
    }

    /// Applies one delivery from the subscription channel.
    pub fn apply_push(&mut self, push: Push) {
        match push {
            Push::Data(Some(records)) => self.replace(records),
            // Company not resolved yet, nothing to show or clear.
            Push::Data(None) => debug!("Received empty push"),
            Push::Error(info) => {
                warn!("Push delivered an error: {info}");
                self.fail(format!("Error loading buses: {info}"));
            }
        }
        self.is_loading = false;
    }

    /// Flips the passenger list of one bus. Unknown ids are ignored.
    /// Returns whether a bus was found.
    pub fn toggle(&mut self, bus_id: &str) -> bool {
        match self.views.iter_mut().find(|view| &**view.id() == bus_id) {
            Some(view) => {
                view.toggle();
                true
            }
            None => false,
        }
    }

    /// Marks a refresh as started. Returns `false` when `guard` is set and another
    /// refresh has not settled yet, in which case nothing changes.
    pub fn begin_refresh(&mut self, guard: bool) -> bool {
        if guard && self.refreshes_in_flight > 0 {
            return false;
        }
        self.refreshes_in_flight += 1;
        self.is_loading = true;
        true
    }

    /// Settles a refresh started with [`Dashboard::begin_refresh`] and returns the
    /// notification the user should see. Always leaves the loading state.
    pub fn finish_refresh(&mut self, result: Result<Vec<BusRecord>, Error>) -> Notification {
        let notification = match result {
            Ok(records) => {
                self.replace(records);
                Notification::refreshed()
            }
            Err(err) => {
                warn!("Refresh failed: {err}");
                self.fail(format!("Error refreshing data: {err}"));
                Notification::refresh_failed()
            }
        };
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);
        self.is_loading = false;
        notification
    }

    /// Settles a refresh whose pull never completed, for instance because the caller
    /// went away. Leaves the list and error as they are and sends no notification.
    pub fn abandon_refresh(&mut self) {
        self.refreshes_in_flight = self.refreshes_in_flight.saturating_sub(1);
        self.is_loading = false;
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            company_name: self.company.as_ref().map(|company| company.name.clone()),
            buses: self.views.clone(),
            has_buses: self.has_buses(),
            is_loading: self.is_loading,
            error: self.last_error.clone(),
            refreshed_at: self.refreshed_at,
        }
    }

    fn replace(&mut self, records: Vec<BusRecord>) {
        let toggles = view::toggle_state(&self.views);
        self.views = view::derive(records, &toggles);
        self.last_error = None;
        self.refreshed_at = Some(Local::now());
    }

    fn fail(&mut self, message: String) {
        self.views.clear();
        self.last_error = Some(message);
    }
}

/// Point in time copy of a [`Dashboard`], ready to be serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub company_name: Option<Arc<str>>,
    pub buses: Vec<DerivedBusView>,
    pub has_buses: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Local>>,
}
