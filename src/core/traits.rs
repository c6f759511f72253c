//! DI "Interfaces"

use crate::core::conversation::{
    ConversationExport, ConversationSnapshot, HistoryDirection, SubmitError,
};
use crate::infrastructure::entities;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("user with this email already exists")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new user and issues a bearer token for them.
    ///
    /// Returns `DuplicateEmail` if the email is already taken. Field
    /// validation (presence, password length) is the caller's concern.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(entities::User, String), AuthError>;

    /// Verifies credentials and issues a bearer token.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller: both are `InvalidCredentials`.
    async fn login(&self, email: &str, password: &str) -> Result<(entities::User, String), AuthError>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Runs one full turn for the given user's conversation: availability
    /// probe, then generation or fallback, then resolution. Returns the
    /// assistant's reply text.
    ///
    /// Rejects blank input and overlapping submissions (single-flight per
    /// conversation). Provider failures never surface here; they resolve to
    /// fallback text.
    async fn send_message(&self, user_id: Uuid, message: &str) -> Result<String, SubmitError>;

    /// The user's message sequence plus the advisory error, if any.
    async fn snapshot(&self, user_id: Uuid) -> ConversationSnapshot;

    /// Empties the conversation. Does not cancel an in-flight turn; a late
    /// resolution lands as a no-op.
    async fn clear_conversation(&self, user_id: Uuid);

    /// The message sequence plus an export timestamp, for download.
    async fn export_conversation(&self, user_id: Uuid) -> ConversationExport;

    /// Moves the input-recall cursor and returns the entry under it, or an
    /// empty string when leaving recall.
    async fn navigate_history(&self, user_id: Uuid, direction: HistoryDirection) -> String;
}
