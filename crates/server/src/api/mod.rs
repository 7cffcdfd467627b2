mod dashboard;
mod notifications;
mod push;

pub use dashboard::*;
pub use notifications::*;
pub use push::*;
