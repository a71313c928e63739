//! Client Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The call never produced a reply
    #[error("network failure: {0}")]
    Network(String),
    /// The server answered `{ok: false}`
    #[error("server error ({kind}): {message}")]
    Server { kind: String, message: String },
    #[error("malformed reply: {0}")]
    Decode(String),
    #[error("item {0} is not on the board")]
    UnknownItem(u32),
    #[error("container {0} is not on the board")]
    UnknownContainer(u32),
    #[error("no drag gesture in progress")]
    NoActiveGesture,
    #[error("a drag gesture is already in progress")]
    GestureInProgress,
}

impl ClientError {
    /// Failures of a persistence call; local state can no longer be trusted
    pub fn needs_resync(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Server { .. } | ClientError::Decode(_)
        )
    }
}
