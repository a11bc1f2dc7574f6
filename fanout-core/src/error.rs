// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the fanout broadcast primitives.
//!
//! Two error families exist:
//!
//! - [`FanoutError`] covers stream-level failures: configuration mistakes
//!   rejected at construction time, upstream producer failures and general
//!   stream processing errors.
//! - [`SubjectError`] covers subject-level operations (`emit`, `subscribe`)
//!   that can only fail because the subject has been closed.
//!
//! Cancellation is deliberately absent from both: a cancelled subscriber or
//! sharing session ends its streams without an error item.

/// Root error type for fanout operations.
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// Stream processing encountered an error that does not fit a more
    /// specific category.
    #[error("stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong.
        context: String,
    },

    /// A sharing configuration was rejected at construction time.
    ///
    /// Configuration errors are fatal to the call that produced them and are
    /// never retried.
    #[error("invalid sharing configuration: {context}")]
    ConfigurationError {
        /// Description of the rejected configuration.
        context: String,
    },

    /// The upstream cold source failed while being drained.
    ///
    /// An upstream failure stops the producer task; the broadcast itself
    /// stays subscribable and simply goes idle.
    #[error("upstream source failed: {0}")]
    UpstreamError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FanoutError {
    /// Create a stream processing error with the given context.
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a configuration error with the given context.
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigurationError {
            context: context.into(),
        }
    }

    /// Wrap an upstream producer failure.
    pub fn upstream_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UpstreamError(Box::new(error))
    }
}

impl Clone for FanoutError {
    fn clone(&self) -> Self {
        match self {
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            Self::ConfigurationError { context } => Self::ConfigurationError {
                context: context.clone(),
            },
            // The boxed source cannot be cloned; degrade to its message.
            Self::UpstreamError(e) => Self::StreamProcessingError {
                context: format!("upstream source failed: {e}"),
            },
        }
    }
}

/// Specialized `Result` type for fanout operations.
pub type Result<T> = std::result::Result<T, FanoutError>;

/// Errors returned by subject-level operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubjectError {
    /// The subject has been closed; it no longer accepts emissions or
    /// subscribers.
    #[error("subject has been closed")]
    Closed,
}
