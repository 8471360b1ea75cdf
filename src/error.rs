//! Error taxonomy for coordinator operations.

use thiserror::Error;
use validator::ValidationErrors;

use crate::logic::LengthMismatch;

/// Errors produced while handling a client event.
///
/// Every variant maps to an `error` event delivered only to the originating
/// connection; none of them are fatal to the process or visible to other
/// connections.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced lobby does not exist (stale code or already deleted).
    #[error("lobby not found")]
    LobbyNotFound,
    /// Referenced game does not exist.
    #[error("game not found")]
    GameNotFound,
    /// Lobby exists but is not accepting players.
    #[error("lobby is not open for joining")]
    NotJoinable,
    /// A non-host attempted a host-only action.
    #[error("only the host can do that")]
    Forbidden,
    /// Submitted number fails the format/length/uniqueness check.
    #[error("invalid number")]
    InvalidNumber,
    /// Inbound payload failed structural validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// Could not allocate an unused lobby code after bounded retries.
    #[error("could not allocate a unique lobby code")]
    CodeSpaceExhausted,
    /// Internal contract violation; indicates a server bug, not user error.
    #[error("internal error: {0}")]
    Internal(#[from] LengthMismatch),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidPayload(err.to_string())
    }
}
