//! Implementations for the services the app needs.
//!

use crate::core::assistant::{ChatMessage, SYSTEM_PROMPT};
use crate::core::conversation::{
    Conversation, ConversationExport, ConversationSnapshot, HistoryDirection, SubmitError,
    TurnEvent, TurnPhase, advance,
};
use crate::core::traits::{AuthError, AuthService, ChatService};
use crate::core::{auth, fallback};
use crate::infrastructure::entities::User;
use crate::infrastructure::traits::{CompletionProvider, UserRepository, UserStoreError};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, inject, injectable};
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

type Session = Arc<Mutex<Conversation>>;

pub struct MyChatService {
    provider: Ref<dyn CompletionProvider>,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

#[injectable(ChatService)]
impl MyChatService {
    #[inject]
    pub fn create(provider: Ref<dyn CompletionProvider>) -> MyChatService {
        MyChatService {
            provider,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl MyChatService {
    async fn session(&self, user_id: Uuid) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(user_id).or_default().clone()
    }
}

#[async_trait]
impl ChatService for MyChatService {
    async fn send_message(&self, user_id: Uuid, message: &str) -> Result<String, SubmitError> {
        let session = self.session(user_id).await;

        // Bookkeeping happens under the conversation lock; the network
        // round trips do not, so clear/snapshot stay responsive mid-turn.
        let (placeholder_id, transcript) = {
            let mut conversation = session.lock().await;
            let placeholder_id = conversation.begin_turn(message)?;
            let transcript: Vec<ChatMessage> = conversation
                .messages()
                .iter()
                .filter(|m| !m.is_loading)
                .map(ChatMessage::from)
                .collect();
            (placeholder_id, transcript)
        };

        let mut phase = TurnPhase::AwaitingAvailability;
        let resolution = loop {
            phase = match phase {
                TurnPhase::AwaitingAvailability => {
                    let available = self.provider.is_available().await;
                    advance(
                        TurnPhase::AwaitingAvailability,
                        TurnEvent::ProbeFinished { available },
                    )
                }
                TurnPhase::Generating => {
                    match self.provider.complete(SYSTEM_PROMPT, &transcript).await {
                        Ok(text) => advance(TurnPhase::Generating, TurnEvent::GenerationSucceeded(text)),
                        Err(err) => {
                            warn!("completion failed: {err}");
                            advance(TurnPhase::Generating, TurnEvent::GenerationFailed)
                        }
                    }
                }
                falling @ TurnPhase::FallingBack { .. } => {
                    // keyed off the raw submitted input, not the transcript
                    let text = fallback::generate(message);
                    advance(falling, TurnEvent::FallbackComputed(text))
                }
                TurnPhase::Resolved(resolution) => break resolution,
            };
        };

        let text = resolution.text.clone();
        session.lock().await.resolve_turn(placeholder_id, resolution);
        Ok(text)
    }

    async fn snapshot(&self, user_id: Uuid) -> ConversationSnapshot {
        let session = self.session(user_id).await;
        let conversation = session.lock().await;
        ConversationSnapshot {
            messages: conversation.messages().to_vec(),
            error: conversation.error().map(str::to_owned),
        }
    }

    async fn clear_conversation(&self, user_id: Uuid) {
        let session = self.session(user_id).await;
        session.lock().await.clear();
    }

    async fn export_conversation(&self, user_id: Uuid) -> ConversationExport {
        let session = self.session(user_id).await;
        let conversation = session.lock().await;
        ConversationExport {
            messages: conversation.messages().to_vec(),
            exported_at: Utc::now(),
        }
    }

    async fn navigate_history(&self, user_id: Uuid, direction: HistoryDirection) -> String {
        let session = self.session(user_id).await;
        let mut conversation = session.lock().await;
        conversation.navigate_history(direction)
    }
}

#[injectable(AuthService)]
pub struct MyAuthService {
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl AuthService for MyAuthService {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let password_hash = auth::hash_password(password);
        let user = self
            .users
            .create(name, email, &password_hash)
            .await
            .map_err(|_: UserStoreError| AuthError::DuplicateEmail)?;
        let token = auth::generate_token(user.id);
        Ok((user, token))
    }

    async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let record = self
            .users
            .find_by_email(email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;
        if !auth::verify_password(password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        let token = auth::generate_token(record.user.id);
        Ok((record.user, token))
    }
}
