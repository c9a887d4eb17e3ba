//! The remote "update flight" capability and its implementations.

mod http;
mod memory;
mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::flight::Flight;

pub use http::HttpFlightClient;
pub use memory::InMemoryFlightStore;
pub use mock::{MockResponse, MockUpdater};

/// Failure of a save call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// No usable response: connection failure, timeout, unreadable body.
    #[error("transport error: {0}")]
    Transport(String),
}

impl UpdateError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Http { message, .. } | Self::Transport(message) => message,
        }
    }
}

/// Persists a flight and returns the stored record.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    async fn update_flight(&self, flight: &Flight) -> Result<Flight, UpdateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_mentions_status_when_present() {
        assert_eq!(UpdateError::http(404, "gone").status(), Some(404));
        assert_eq!(UpdateError::transport("reset").status(), None);

        assert_eq!(
            UpdateError::http(500, "boom").to_string(),
            "HTTP 500: boom"
        );
        assert_eq!(
            UpdateError::transport("connection refused").to_string(),
            "transport error: connection refused"
        );
    }
}
