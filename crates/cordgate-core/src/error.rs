//! Shared error type across cordgate crates.

use thiserror::Error;

/// Stable error codes, one per error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Frame could not be decoded into an envelope.
    MalformedEnvelope,
    /// Server broke the handshake or sequencing rules.
    ProtocolViolation,
    /// A registered handler returned an error or panicked.
    HandlerFailure,
    /// Socket error, close or failed send.
    TransportFailure,
    /// Bad caller input at connect time.
    InvalidConfiguration,
    /// Client was closed.
    Closed,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::ProtocolViolation => "PROTOCOL_VIOLATION",
            ErrorCode::HandlerFailure => "HANDLER_FAILURE",
            ErrorCode::TransportFailure => "TRANSPORT_FAILURE",
            ErrorCode::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorCode::Closed => "CLOSED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("handler failure: {0}")]
    HandlerFailure(String),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("client closed")]
    Closed,
}

impl GatewayError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            GatewayError::ProtocolViolation(_) => ErrorCode::ProtocolViolation,
            GatewayError::HandlerFailure(_) => ErrorCode::HandlerFailure,
            GatewayError::TransportFailure(_) => ErrorCode::TransportFailure,
            GatewayError::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            GatewayError::Closed => ErrorCode::Closed,
        }
    }

    /// Whether the session recovers from this error on its own (reconnect or drop-and-log).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GatewayError::InvalidConfiguration(_) | GatewayError::Closed
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_and_close_are_terminal() {
        assert!(GatewayError::MalformedEnvelope("x".into()).is_recoverable());
        assert!(GatewayError::TransportFailure("x".into()).is_recoverable());
        assert!(!GatewayError::InvalidConfiguration("x".into()).is_recoverable());
        assert!(!GatewayError::Closed.is_recoverable());
        assert_eq!(
            GatewayError::ProtocolViolation("hello twice".into()).code().as_str(),
            "PROTOCOL_VIOLATION"
        );
    }
}
