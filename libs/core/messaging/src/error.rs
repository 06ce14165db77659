//! Error types for message handling.

use std::fmt;
use thiserror::Error;

/// Error categories decide what happens to the inbound message.
///
/// - **Transient**: a dependency was unavailable (database down, broker hiccup)
/// - **Permanent**: the handler gave up on a well-formed message
/// - **Malformed**: the payload itself is unusable (bad JSON, missing field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Permanent,
    Malformed,
}

impl ErrorCategory {
    /// Broker action for a failed message in this category.
    ///
    /// Malformed payloads are acknowledged so they never come back. Everything else is
    /// terminated, except transient failures when `requeue_transient` is set.
    pub fn disposition(&self, requeue_transient: bool) -> Disposition {
        match self {
            ErrorCategory::Malformed => Disposition::Ack,
            ErrorCategory::Transient if requeue_transient => Disposition::Nak,
            ErrorCategory::Transient | ErrorCategory::Permanent => Disposition::Term,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::Permanent => write!(f, "permanent"),
            ErrorCategory::Malformed => write!(f, "malformed"),
        }
    }
}

/// What the consumer tells the broker once a message is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Remove the message
    Ack,
    /// Reject without redelivery
    Term,
    /// Reject and ask for redelivery
    Nak,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Ack => write!(f, "ack"),
            Disposition::Term => write!(f, "term"),
            Disposition::Nak => write!(f, "nak"),
        }
    }
}

/// Error returned by a [`MessageHandler`](crate::MessageHandler).
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("transient error: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("permanent error: {message}")]
    Permanent {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("invalid payload: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl ProcessingError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            source: None,
        }
    }

    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
            source: None,
        }
    }

    pub fn permanent_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Permanent {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProcessingError::Transient { .. } => ErrorCategory::Transient,
            ProcessingError::Permanent { .. } => ErrorCategory::Permanent,
            ProcessingError::Malformed(_) | ProcessingError::Deserialization(_) => {
                ErrorCategory::Malformed
            }
        }
    }

    pub fn disposition(&self, requeue_transient: bool) -> Disposition {
        self.category().disposition(requeue_transient)
    }
}
