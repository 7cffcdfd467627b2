//! Capabilities the dashboard consumes from the outside world.
//!
//! Fetching records, looking up the company and showing notifications are all provided
//! by the host. The dashboard only talks to them through the traits in this module.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt::Display, future::Future};

use crate::records::{BusRecord, Company};

/// Shown when a failure carries no readable message.
pub const FALLBACK_MESSAGE: &str = "Unknown error";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The upstream could not be reached.
    Unavailable,
    /// The upstream answered with a failure.
    Upstream,
    /// The upstream answered but the payload could not be read.
    Decode,
    Timeout,
    #[default]
    Unknown,
}

/// Failure reported by a collaborator.
///
/// Deserializes from its own shape (`{"code", "message"}`) as well as from the raw
/// `{"body": {"message"}}` errors upstream services send. A missing code is `Unknown`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: Option<String>,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Reads an error the way upstream services shape them: `{"body": {"message": "..."}}`.
    /// Anything else keeps the code and drops the message.
    pub fn from_value(code: ErrorCode, value: &Value) -> Self {
        let message = value
            .pointer("/body/message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string);
        Self { code, message }
    }

    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(FALLBACK_MESSAGE)
    }
}

impl<'de> Deserialize<'de> for ErrorInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let code = value
            .get("code")
            .and_then(|code| ErrorCode::deserialize(code).ok())
            .unwrap_or_default();
        match value.get("message").and_then(Value::as_str) {
            Some(message) => Ok(Self::new(code, message)),
            None => Ok(Self::from_value(code, &value)),
        }
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ErrorInfo {}

/// One delivery on the subscription channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Push {
    /// `None` while the company is not resolved yet. Not the same as an empty fleet.
    Data(Option<Vec<BusRecord>>),
    Error(ErrorInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Error,
}

/// Short lived feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn refreshed() -> Self {
        Self {
            title: "Success".into(),
            message: "Bus data refreshed successfully".into(),
            variant: NotificationVariant::Success,
        }
    }

    pub fn refresh_failed() -> Self {
        Self {
            title: "Error".into(),
            message: "Failed to refresh bus data".into(),
            variant: NotificationVariant::Error,
        }
    }
}

/// On demand pull of every bus of a company, passengers included.
pub trait BusSource: Send + Sync {
    fn fetch(
        &self,
        company_id: &str,
    ) -> impl Future<Output = Result<Vec<BusRecord>, ErrorInfo>> + Send;
}

/// Resolves a company id to its record.
pub trait CompanyDirectory: Send + Sync {
    fn company(
        &self,
        company_id: &str,
    ) -> impl Future<Output = Result<Option<Company>, ErrorInfo>> + Send;
}

/// Fire and forget delivery of notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[test]
fn error_message_from_body() {
    let value = serde_json::json!({ "status": 500, "body": { "message": "Apex exploded" } });
    let info = ErrorInfo::from_value(ErrorCode::Upstream, &value);
    assert_eq!(info.message(), "Apex exploded");
    assert_eq!(info.to_string(), "Apex exploded");
}

#[test]
fn push_error_reads_body_message() {
    let raw = r#"{"error": {"body": {"message": "Insufficient access"}}}"#;
    let push: Push = serde_json::from_str(raw).unwrap();
    assert_eq!(
        push,
        Push::Error(ErrorInfo::new(ErrorCode::Unknown, "Insufficient access"))
    );
}

#[test]
fn push_error_reads_plain_message() {
    let push: Push = serde_json::from_str(r#"{"error": {"message": "x"}}"#).unwrap();
    assert_eq!(push, Push::Error(ErrorInfo::new(ErrorCode::Unknown, "x")));

    let push: Push =
        serde_json::from_str(r#"{"error": {"code": "timeout", "message": "slow"}}"#).unwrap();
    assert_eq!(push, Push::Error(ErrorInfo::new(ErrorCode::Timeout, "slow")));

    let push: Push = serde_json::from_str(r#"{"error": {}}"#).unwrap();
    assert_eq!(push, Push::Error(ErrorInfo::default()));
}

#[test]
fn error_message_falls_back() {
    let info = ErrorInfo::from_value(ErrorCode::Unknown, &serde_json::json!({ "status": 500 }));
    assert!(info.message.is_none());
    assert_eq!(info.message(), FALLBACK_MESSAGE);

    let blank = ErrorInfo::new(ErrorCode::Upstream, "  ");
    assert_eq!(blank.message(), FALLBACK_MESSAGE);
}
