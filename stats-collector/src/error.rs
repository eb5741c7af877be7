use reqwest::StatusCode;
use url::Url;

/// The controller could not be asked for its stats.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Controller URL {url} cannot be used to reach the stats endpoint: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Building the HTTP client failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} timed out")]
    Timeout {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Controller at {url} answered with status {status}")]
    Status { url: Url, status: StatusCode },
}

impl FetchError {
    pub(crate) fn from_request(url: &Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.clone(),
                source,
            }
        } else {
            Self::Request {
                url: url.clone(),
                source,
            }
        }
    }
}

/// The stats body is not structured data at all.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Stats body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stats body is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

/// Why a scrape fell back to the zero snapshot.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Collecting volume stats panicked: {0}")]
    Panicked(String),
}

impl CollectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectError::Fetch(_) => ErrorKind::Fetch,
            CollectError::Decode(_) => ErrorKind::Decode,
            CollectError::Panicked(_) => ErrorKind::Panic,
        }
    }
}

/// Label value of the collection error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Fetch,
    Decode,
    Panic,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [ErrorKind::Fetch, ErrorKind::Decode, ErrorKind::Panic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Fetch => "fetch",
            ErrorKind::Decode => "decode",
            ErrorKind::Panic => "panic",
        }
    }
}

/// A collector could not be built.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Client(#[from] FetchError),
    #[error("Metric definitions for namespace {namespace:?} are invalid: {source}")]
    Metrics {
        namespace: String,
        #[source]
        source: prometheus::Error,
    },
}

/// Registering or unregistering a collector failed.
#[derive(thiserror::Error, Debug)]
pub enum RegistrationError {
    #[error("A collector for {0} is already registered")]
    AlreadyRegistered(String),
    #[error("No collector for {0} is registered")]
    NotRegistered(String),
    #[error("The metrics registry rejected the collector for {volume}: {source}")]
    Rejected {
        volume: String,
        #[source]
        source: prometheus::Error,
    },
}
