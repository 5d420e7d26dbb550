/// Errors raised by a [`Shell`](crate::Shell).
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("could not open {target}: {message}")]
    Open { target: String, message: String },

    #[error("could not start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{0} timed out")]
    Timeout(String),

    #[error("could not stop {0}")]
    Terminate(String),

    #[error("could not delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
