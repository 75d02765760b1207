use pdb_query::QueryError;

/// Errors surfaced by the client. None of them are retried internally.
#[derive(Debug)]
pub enum PdbError {
    /// Unsupported API version or unusable credentials
    Configuration(String),
    /// Connection, TLS handshake or certificate verification failure
    Transport(String),
    /// Server answered with a non-2xx status
    HttpStatus { status_line: String, body: String },
    /// Body is not JSON or not of the expected row shape
    MalformedResponse(String),
    /// Filter could not be turned into a query
    Query(QueryError),
}

impl From<QueryError> for PdbError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownApiVersion(_) => PdbError::Configuration(err.to_string()),
            other => PdbError::Query(other),
        }
    }
}

impl std::fmt::Display for PdbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdbError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            PdbError::Transport(msg) => write!(f, "Transport error: {}", msg),
            PdbError::HttpStatus { status_line, body } => {
                write!(f, "Status: {}, Response: {}", status_line, body)
            }
            PdbError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            PdbError::Query(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PdbError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_version_is_configuration_error() {
        let err = PdbError::from(QueryError::UnknownApiVersion("v9".to_string()));
        assert!(matches!(err, PdbError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Got unknown PuppetDB API version: v9"
        );
    }

    #[test]
    fn test_http_status_display() {
        let err = PdbError::HttpStatus {
            status_line: "HTTP/1.1 404 Not Found".to_string(),
            body: "no such endpoint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Status: HTTP/1.1 404 Not Found, Response: no such endpoint"
        );
    }
}
