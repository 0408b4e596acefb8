use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    FlowStoreSource(String),
    DuplicateService(String),
    BadUrlFormatting(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::FlowStoreSource(e) => write!(f, "Flow store configuration error: {}", e),
            ConfigError::DuplicateService(e) => write!(f, "Duplicate service name: {}", e),
            ConfigError::BadUrlFormatting(e) => write!(f, "URL formatting error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure of a single call into the flow store.
///
/// Never fatal for a view: it moves to its error state and the next trigger
/// retries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    Transport(String),
    Timeout,
    Status(u16),
    Decode(String),
    Unavailable(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Transport(e) => write!(f, "Flow store transport error: {}", e),
            QueryError::Timeout => write!(f, "Flow store request timed out"),
            QueryError::Status(code) => write!(f, "Flow store answered with status {}", code),
            QueryError::Decode(e) => write!(f, "Flow store response could not be decoded: {}", e),
            QueryError::Unavailable(e) => write!(f, "Flow store unavailable: {}", e),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout
        } else if let Some(status) = err.status() {
            QueryError::Status(status.as_u16())
        } else if err.is_decode() {
            QueryError::Decode(err.to_string())
        } else {
            QueryError::Transport(err.to_string())
        }
    }
}

/// Why a mounted view stopped. Query failures are not in here: a view shows
/// them and keeps running.
#[derive(Debug)]
pub enum ViewError {
    RouterClosed,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::RouterClosed => write!(f, "Router closed while the view was mounted"),
        }
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug)]
pub enum WebError {
    InvalidRequest(String),
    NotFound(String),
    Query(QueryError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            WebError::NotFound(e) => write!(f, "Not found: {}", e),
            WebError::Query(e) => write!(f, "Web query failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

impl From<QueryError> for WebError {
    fn from(err: QueryError) -> Self {
        WebError::Query(err)
    }
}
