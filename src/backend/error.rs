use std::fmt;

#[derive(Debug)]
pub enum BackendError {
    /// Request never completed (connection refused, timeout, ...)
    Transport { request: String, source: reqwest::Error },

    /// Endpoint answered with a non-success HTTP status
    HttpStatus { request: String, status: u16 },

    /// Response body was not the expected JSON
    JsonParse { context: String, source: serde_json::Error },

    /// Request body could not be encoded
    JsonSerialize { context: String, source: serde_json::Error },

    /// File-backed backend could not read or write its config file
    Io { path: String, source: std::io::Error },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport { request, source } => {
                write!(f, "{} request failed: {}", request, source)
            }
            BackendError::HttpStatus { request, status } => {
                write!(f, "{} request answered with HTTP {}", request, status)
            }
            BackendError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            BackendError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            BackendError::Io { path, source } => write!(f, "{}: {}", path, source),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Transport { source, .. } => Some(source),
            BackendError::JsonParse { source, .. } => Some(source),
            BackendError::JsonSerialize { source, .. } => Some(source),
            BackendError::Io { source, .. } => Some(source),
            BackendError::HttpStatus { .. } => None,
        }
    }
}
