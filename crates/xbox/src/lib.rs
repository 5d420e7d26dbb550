//! Xbox / Microsoft Store integration.
//!
//! Discovery is split in two phases. [`AuthFlow`] runs once, interactively,
//! and stores the user's owned package family names in a [`ResultCache`].
//! [`XboxScanner`] then runs on every scan and only intersects that cached
//! set with the packages installed locally, so it never touches the network.

pub mod auth;
pub mod cache;
pub mod error;
pub mod live;
pub mod manifest;
pub mod packages;
pub mod scanner;

// Re-export primary types.
pub use auth::{AuthFlow, AuthState, EntitlementApi, OwnedTitle, XstsToken};
pub use cache::{
    Entitlements, JsonFileCache, METADATA_KEY, MemoryCache, OWNED_KEY, ResultCache, TitleMeta,
};
pub use error::{AuthError, CacheError, XboxError};
pub use live::LiveApi;
pub use packages::{AppxPackage, PackageSource, PowerShellPackages};
pub use scanner::XboxScanner;
