pub mod config;
pub mod records;
pub mod refresh;
pub mod source;
pub mod view;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::records::{BusRecord, BusStatus, Company, PassengerRecord};
    pub use crate::refresh::{
        Dashboard, DashboardSnapshot, RefreshController, RefreshOutcome, Subscription,
    };
    pub use crate::source::{
        BusSource, CompanyDirectory, ErrorCode, ErrorInfo, Notification, NotificationVariant,
        Notifier, Push,
    };
    pub use crate::view::{CAPACITY, DerivedBusView, ListIcon, StatusVariant, ToggleState, derive};
}
