/// Errors raised while building filters or selecting a query dialect
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    UnknownChainOperator(String),
    UnknownSign(String),
    UnknownApiVersion(String),
    Parse(String),
    Encode(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::UnknownChainOperator(op) => {
                write!(f, "Cannot render filter chain with operator: {}", op)
            }
            QueryError::UnknownSign(sign) => write!(f, "Unknown comparison sign: {}", sign),
            QueryError::UnknownApiVersion(version) => {
                write!(f, "Got unknown PuppetDB API version: {}", version)
            }
            QueryError::Parse(msg) => write!(f, "Filter parse error: {}", msg),
            QueryError::Encode(msg) => write!(f, "Failed to encode query parameter {}", msg),
        }
    }
}

impl std::error::Error for QueryError {}
