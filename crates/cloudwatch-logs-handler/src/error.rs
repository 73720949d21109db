// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Failures reported by a [`crate::client::LogsClient`].
///
/// The two token variants form the token-conflict class: the stream moved on
/// since the token was read and the append can succeed against a fresh one.
/// Everything else is final from the handler's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid sequence token, expected: {expected:?}")]
    InvalidSequenceToken { expected: Option<String> },

    #[error("Data already accepted, next token: {expected:?}")]
    DataAlreadyAccepted { expected: Option<String> },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// True for errors that a token refresh followed by a retry can resolve.
    #[must_use]
    pub fn is_token_conflict(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidSequenceToken { .. } | ClientError::DataAlreadyAccepted { .. }
        )
    }
}

/// Errors surfaced to callers of the handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A remote call failed. Token conflicts land here once retries are spent.
    #[error("Remote call failed: {0}")]
    Remote(#[from] ClientError),

    #[error("Handler already closed")]
    Closed,

    #[error("Handler service unavailable: {0}")]
    ServiceUnavailable(String),
}
