/// Errors from the local Xbox scan.
#[derive(Debug, thiserror::Error)]
pub enum XboxError {
    #[error("package enumeration failed: {0}")]
    Packages(String),

    #[error("package enumeration timed out")]
    Timeout,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid launch command: {0}")]
    Command(#[from] gamedeck_model::CommandError),
}

/// Errors from the result cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache directory not available")]
    NoCacheDir,
}

/// Errors returned to the caller of the authorization flow.
///
/// Every variant renders as a sentence suitable for showing to a user.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no authorization code found in the pasted text")]
    MissingCode,

    #[error("could not reach {stage}: {message}")]
    Http { stage: &'static str, message: String },

    #[error("{stage} rejected the request ({status}): {body}")]
    Rejected {
        stage: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {stage}: {message}")]
    Response { stage: &'static str, message: String },

    #[error("could not save entitlements: {0}")]
    Cache(#[from] CacheError),
}
