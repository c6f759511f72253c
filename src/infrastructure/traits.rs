//! Infrastructure traits, used for DI on higher levels

use crate::core::assistant::ChatMessage;
use crate::infrastructure::entities;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("failed to generate a response")]
    GenerationFailed,
    #[error("the completion backend timed out")]
    Timeout,
}

/// An external text-completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Live reachability probe. Never errors: missing configuration,
    /// transport failures, and backend errors all read as `false`. Every
    /// call is a real network round trip, not a flag read.
    async fn is_available(&self) -> bool;

    /// Generates a reply from the system prompt and the transcript so far.
    ///
    /// An empty result is `GenerationFailed`; this never substitutes
    /// fallback text itself — that routing belongs to the caller.
    async fn complete(
        &self,
        system_prompt: &str,
        transcript: &[ChatMessage],
    ) -> Result<String, CompletionError>;

    /// Human-readable backend name, for the status endpoint.
    fn service_name(&self) -> &str;

    /// Model identifier, for the status endpoint.
    fn model_id(&self) -> &str;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("user with this email already exists")]
    DuplicateEmail,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user, rejecting duplicate emails atomically. The returned
    /// user never carries the password hash.
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<entities::User, UserStoreError>;

    /// Full record including the password hash, for credential
    /// verification only.
    async fn find_by_email(&self, email: &str) -> Option<entities::UserRecord>;

    async fn find_by_id(&self, id: Uuid) -> Option<entities::User>;
}
