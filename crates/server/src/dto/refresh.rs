use fleetboard::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Refreshed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshDto {
    pub status: RefreshStatus,
    pub count: Option<usize>,
    pub error: Option<String>,
}

impl RefreshDto {
    pub fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Refreshed(count) => Self {
                status: RefreshStatus::Refreshed,
                count: Some(count),
                error: None,
            },
            RefreshOutcome::Failed(err) => Self {
                status: RefreshStatus::Failed,
                count: None,
                error: Some(err.to_string()),
            },
            RefreshOutcome::Skipped => Self {
                status: RefreshStatus::Skipped,
                count: None,
                error: None,
            },
        }
    }
}
