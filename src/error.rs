//! Error types for the Seger MCP Server

use thiserror::Error;

/// Result type alias for the Seger MCP Server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Seger MCP Server
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream answered with a non-success status
    #[error("HTTP {status} @ {url}")]
    RemoteRequest { status: u16, url: String },

    /// Upstream answered successfully but without the expected payload
    #[error("{context}")]
    UpstreamDataMissing { context: String },

    /// Configured upstream base URL is not a valid URL
    #[error("Invalid upstream base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status reported by the upstream, if this is a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_request_display() {
        let err = Error::RemoteRequest {
            status: 502,
            url: "http://localhost:5000/api/seger/faturas".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 502 @ http://localhost:5000/api/seger/faturas"
        );
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_upstream_data_missing_display() {
        let err = Error::UpstreamDataMissing {
            context: "could not obtain invoice PDF files".to_string(),
        };
        assert_eq!(err.to_string(), "could not obtain invoice PDF files");
        assert_eq!(err.status(), None);
    }
}
