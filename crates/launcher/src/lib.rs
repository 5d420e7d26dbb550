//! Launch and uninstall dispatch.
//!
//! The [`Dispatcher`] is the only component that interprets a
//! [`LaunchCommand`](gamedeck_model::LaunchCommand). All side effects go
//! through the [`Shell`] trait so dispatch can be tested without touching
//! the OS.

pub mod dispatcher;
pub mod error;
pub mod notification;
pub mod shell;

// Re-export primary types.
pub use dispatcher::{ClientRelaunch, Dispatcher};
pub use error::LaunchError;
pub use notification::{Notification, NotificationStyle};
pub use shell::{DEFAULT_TIMEOUT, Shell, SystemShell};
