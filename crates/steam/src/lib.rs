//! Steam integration: install root discovery, text VDF parsing, library
//! folders and app manifests.

pub mod library;
pub mod paths;
pub mod scanner;
pub mod vdf;

// Re-export primary types.
pub use library::{AppManifest, STATE_FULLY_INSTALLED, library_folders, load_manifests};
pub use paths::Paths;
pub use scanner::SteamScanner;
pub use vdf::{Vdf, VdfObject, load_vdf, parse_vdf};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("invalid app manifest: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid launch command: {0}")]
    Command(#[from] gamedeck_model::CommandError),
}
