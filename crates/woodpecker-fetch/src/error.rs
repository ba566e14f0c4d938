//! Error types for byte fetching.

/// Errors that can occur while building a fetcher or fetching a resource.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The resource does not exist (HTTP 404 or missing file).
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a status other than 200 or 404.
    #[error("unexpected http status {status} for {location}")]
    UnexpectedStatus {
        /// The URL that was requested.
        location: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem failure other than "not found".
    #[error("io error reading {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The root location uses a scheme no fetcher handles.
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),

    /// The root location or a requested path could not be parsed.
    #[error("invalid location: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether this error means the resource is absent rather than unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
