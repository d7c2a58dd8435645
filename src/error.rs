//! Error types for tickflow

use thiserror::Error;

use crate::tick::Age;

/// Errors that can occur in tick log operations
#[derive(Debug, Error)]
pub enum TickLogError {
    /// A tick was appended with an age that does not follow the log end
    #[error("out-of-order tick: age {age} does not follow log end {last}")]
    OutOfOrder {
        /// Age of the most recently accepted tick
        last: Age,
        /// Age of the rejected tick
        age: Age,
    },

    /// No start point satisfies the requested frame constraint
    #[error("no start point")]
    NoStartPoint,

    /// The authentication token was not recognized
    #[error("invalid token")]
    InvalidToken,

    /// The upstream provider rejected a query
    #[error("upstream query failed: {0}")]
    Upstream(String),

    /// Operation intentionally not implemented by this client
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl TickLogError {
    /// Create a new Upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_message() {
        let err = TickLogError::OutOfOrder { last: 5, age: 5 };
        assert!(err.to_string().contains("age 5"));
        assert!(err.to_string().contains("log end 5"));
    }

    #[test]
    fn test_upstream_error() {
        let err = TickLogError::upstream("connection reset");
        assert!(matches!(err, TickLogError::Upstream(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_unsupported_error() {
        let err = TickLogError::Unsupported("query");
        assert_eq!(err.to_string(), "unsupported operation: query");
    }
}
