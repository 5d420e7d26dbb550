//! Scanner selection and aggregation.
//!
//! [`Settings`] decides which scanners run; [`Aggregator`] runs them
//! concurrently, isolates their failures, and returns one ordered list.

pub mod aggregator;
pub mod scanner;
pub mod settings;

// Re-export primary types.
pub use aggregator::{Aggregator, ScanContext, ScanReport, ScannerOutcome};
pub use scanner::{ScanError, Scanner, ScannerSlot};
pub use settings::{MAX_SHORTCUT_FOLDERS, Settings, ShortcutFolderSetting};
