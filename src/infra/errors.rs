// src/infra/errors.rs - Error types for the Kubo client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KuboError {
    // Backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Authentication already in progress")]
    AuthInFlight,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KuboError {
    /// HTTP status of an API error, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            KuboError::Api { status, .. } => Some(*status),
            KuboError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Message shown to the user; never empty.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Outcome tag for a rejected or failed booking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Login required to book")]
    LoginRequired,

    #[error("Please select a start and end time")]
    MissingWindow,

    #[error("A booking for this pod is already in progress")]
    InFlight,

    #[error("{0}")]
    Backend(String),
}

impl BookingError {
    /// Validation failures never reached the network.
    pub fn is_local(&self) -> bool {
        !matches!(self, BookingError::Backend(_))
    }
}
