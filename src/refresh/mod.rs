pub mod state;

pub use state::*;

use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    records::{BusRecord, CompanyId},
    source::{BusSource, CompanyDirectory, ErrorInfo, Notifier, Push},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Fetch(ErrorInfo),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ErrorInfo> for Error {
    fn from(value: ErrorInfo) -> Self {
        Self::Fetch(value)
    }
}

/// What a call to [`RefreshController::request_refresh`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The list was replaced with this many buses.
    Refreshed(usize),
    /// The pull failed. The list is now empty and the error is recorded.
    Failed(Error),
    /// Another refresh was still running.
    Skipped,
}

/// Keeps one company's [`Dashboard`] in sync with its sources.
pub struct RefreshController<S, N> {
    company_id: CompanyId,
    source: S,
    notifier: N,
    config: Config,
    dashboard: RwLock<Dashboard>,
}

impl<S, N> RefreshController<S, N>
where
    S: BusSource,
    N: Notifier,
{
    pub fn new(company_id: impl Into<CompanyId>, source: S, notifier: N) -> Self {
        Self::with_config(company_id, source, notifier, Config::default())
    }

    pub fn with_config(
        company_id: impl Into<CompanyId>,
        source: S,
        notifier: N,
        config: Config,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            source,
            notifier,
            config,
            dashboard: RwLock::new(Dashboard::new()),
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.read().snapshot()
    }

    /// Read access to the current state.
    pub async fn with_dashboard<T>(&self, f: impl FnOnce(&Dashboard) -> T) -> T {
        f(&self.read())
    }

    /// Handles a delivery from the subscription channel. Never notifies the user.
    pub async fn on_data_pushed(&self, push: Push) {
        self.write().apply_push(push);
    }

    pub async fn toggle_item(&self, bus_id: &str) -> bool {
        let found = self.write().toggle(bus_id);
        if !found {
            debug!("Toggle ignored, no bus with id {bus_id}");
        }
        found
    }

    /// Pulls a fresh list for the company and replaces the current one, keeping the
    /// expanded/collapsed choice of buses that are still there.
    pub async fn request_refresh(&self) -> RefreshOutcome {
        let started = self
            .write()
            .begin_refresh(self.config.guard_concurrent_refresh);
        if !started {
            warn!("Refresh for {} already running, skipping", self.company_id);
            return RefreshOutcome::Skipped;
        }
        let mut in_flight = InFlight {
            dashboard: &self.dashboard,
            settled: false,
        };

        let result = self.fetch().await;
        let outcome = match &result {
            Ok(records) => RefreshOutcome::Refreshed(records.len()),
            Err(err) => RefreshOutcome::Failed(err.clone()),
        };
        let notification = self.write().finish_refresh(result);
        in_flight.settled = true;
        self.notifier.notify(notification);

        if let RefreshOutcome::Refreshed(count) = outcome {
            info!("Refreshed {count} buses for {}", self.company_id);
        }
        outcome
    }

    /// Looks up the company record. A failed lookup leaves the name unset.
    pub async fn resolve_company<D: CompanyDirectory>(&self, directory: &D) {
        let company = match directory.company(&self.company_id).await {
            Ok(company) => company,
            Err(err) => {
                warn!("Failed to look up company {}: {err}", self.company_id);
                None
            }
        };
        self.write().set_company(company);
    }

    fn read(&self) -> RwLockReadGuard<'_, Dashboard> {
        self.dashboard.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Dashboard> {
        write_dashboard(&self.dashboard)
    }

    async fn fetch(&self) -> Result<Vec<BusRecord>, Error> {
        let timeout = self.config.refresh_timeout;
        match tokio::time::timeout(timeout, self.source.fetch(&self.company_id)).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }
}

fn write_dashboard(dashboard: &RwLock<Dashboard>) -> RwLockWriteGuard<'_, Dashboard> {
    dashboard.write().unwrap_or_else(PoisonError::into_inner)
}

/// Settles a started refresh if its future is dropped before the pull completes.
struct InFlight<'a> {
    dashboard: &'a RwLock<Dashboard>,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Refresh dropped before it settled");
            write_dashboard(self.dashboard).abandon_refresh();
        }
    }
}

impl<S, N> RefreshController<S, N>
where
    S: BusSource + 'static,
    N: Notifier + 'static,
{
    /// Registers the controller as the handler of a push channel.
    /// Pushes are handled until the channel closes or the returned handle is dropped.
    pub fn subscribe(self: &Arc<Self>, mut pushes: mpsc::Receiver<Push>) -> Subscription {
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(push) = pushes.recv().await {
                controller.on_data_pushed(push).await;
            }
            debug!("Push channel for {} closed", controller.company_id);
        });
        Subscription { handle }
    }
}

/// Live registration on a push channel. Dropping it deregisters the handler.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
