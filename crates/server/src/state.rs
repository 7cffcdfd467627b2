use crate::{notifications::QueueNotifier, upstream::HttpUpstream};
use fleetboard::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc;

pub type Controller = RefreshController<HttpUpstream, Arc<QueueNotifier>>;

pub struct AppState {
    pub controller: Arc<Controller>,
    pub pushes: mpsc::Sender<Push>,
    pub notifications: Arc<QueueNotifier>,
}
