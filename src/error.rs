//! The error taxonomy shared by every gateway. Screens only ever look at the
//! display message, so transports are free to map their own failures onto
//! whichever kind fits best.

/// Failure reported by a gateway call or by form validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The submitted data was rejected, either locally or by the backend.
    #[error("{0}")]
    Validation(String),
    /// The backend could not be reached.
    #[error("{0}")]
    Network(String),
    /// The backend answered, but with a failure.
    #[error("{0}")]
    Server(String),
}

impl GatewayError {
    /// Text shown to the user as the notification description.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Validation(message)
            | GatewayError::Network(message)
            | GatewayError::Server(message) => message,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Network(_) => "network",
            GatewayError::Server(_) => "server",
        }
    }
}
