//! Scanners for the storefronts that need no network access.
//!
//! | Scanner | Metadata source |
//! |---|---|
//! | [`EpicScanner`] | `*.item` JSON manifests in the launcher's data directory |
//! | [`GogScanner`] | `GOG.com\Games` registry catalog + Galaxy client |
//! | [`EaScanner`] | uninstall registry + `__Installer/installerdata.xml` |
//! | [`UbisoftScanner`] | uninstall registry (`Uplay Install <id>`) |
//! | [`PlayniteScanner`] | exported library snapshot, else per-title JSON store |
//! | [`ShortcutScanner`] | `.url` / `.lnk` files in configured folders |
//!
//! Each scanner is synchronous and cheap to clone; callers run them on a
//! blocking thread.

pub mod cmdline;
pub mod ea;
pub mod epic;
pub mod error;
pub mod gog;
pub mod lenient;
pub mod playnite;
pub mod shortcuts;
pub mod ubisoft;

pub use ea::EaScanner;
pub use epic::EpicScanner;
pub use error::StoreError;
pub use gog::GogScanner;
pub use playnite::PlayniteScanner;
pub use shortcuts::{ShortcutFolder, ShortcutScanner};
pub use ubisoft::UbisoftScanner;
