//! Error types for the storefront scanners.

/// Errors that make a whole platform unusable.
///
/// Per-record problems never surface as a `StoreError`; the record is
/// logged and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("GOG Galaxy client not found")]
    GalaxyClientNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("invalid launch command: {0}")]
    Command(#[from] gamedeck_model::CommandError),
}
