// src/store/status.rs - Pod/booking status line

use crate::infra::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// A request is in flight.
    Pending,
    /// Cleared automatically after a short delay.
    Success,
    /// Stays until the next status replaces it.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Pending,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl From<&BookingError> for StatusMessage {
    fn from(err: &BookingError) -> Self {
        StatusMessage::error(err.to_string())
    }
}
