//! Conversation endpoints
//!
//! Server-side surface of the per-user conversation session: message
//! listing, wholesale clear, export, and input-recall navigation.

use crate::api::ExtractUser;
use crate::core::traits::ChatService;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/clear", post(clear_conversation))
        .route("/export", get(export_conversation))
        .route("/history", post(navigate_history))
}

async fn list_messages(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
) -> (StatusCode, Json<schemas::MessagesList>) {
    let snapshot = chat_service.snapshot(current_user).await;
    (
        StatusCode::OK,
        Json(schemas::MessagesList {
            messages: snapshot
                .messages
                .into_iter()
                .map(schemas::Message::from)
                .collect(),
            error: snapshot.error,
        }),
    )
}

async fn clear_conversation(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
) -> StatusCode {
    chat_service.clear_conversation(current_user).await;
    StatusCode::NO_CONTENT
}

/// An empty conversation still exports; gating on that is the caller's
/// choice.
async fn export_conversation(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
) -> impl IntoResponse {
    let export = chat_service.export_conversation(current_user).await;
    let filename = format!("chat-export-{}.json", Utc::now().format("%Y-%m-%d"));

    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )],
        Json(schemas::ExportDocument {
            messages: export
                .messages
                .into_iter()
                .map(schemas::Message::from)
                .collect(),
            exported_at: export.exported_at,
        }),
    )
}

async fn navigate_history(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<schemas::NavigateHistory>,
) -> (StatusCode, Json<schemas::HistoryEntry>) {
    let entry = chat_service
        .navigate_history(current_user, request.direction.into())
        .await;
    (StatusCode::OK, Json(schemas::HistoryEntry { entry }))
}

pub mod schemas {
    use crate::core::conversation;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "lowercase")]
    pub enum Sender {
        User,
        Bot,
    }

    impl From<conversation::Sender> for Sender {
        fn from(sender: conversation::Sender) -> Self {
            match sender {
                conversation::Sender::User => Sender::User,
                conversation::Sender::Bot => Sender::Bot,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Message {
        pub id: Uuid,
        pub content: String,
        pub sender: Sender,
        pub timestamp: DateTime<Utc>,
        pub is_loading: bool,
    }

    impl From<conversation::Message> for Message {
        fn from(message: conversation::Message) -> Self {
            Message {
                id: message.id,
                content: message.content,
                sender: message.sender.into(),
                timestamp: message.timestamp,
                is_loading: message.is_loading,
            }
        }
    }

    #[derive(Serialize, Debug, Default)]
    pub struct MessagesList {
        pub messages: Vec<Message>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ExportDocument {
        pub messages: Vec<Message>,
        pub exported_at: DateTime<Utc>,
    }

    #[derive(Deserialize, Debug, Clone, Copy)]
    #[serde(rename_all = "lowercase")]
    pub enum Direction {
        Up,
        Down,
    }

    impl From<Direction> for conversation::HistoryDirection {
        fn from(direction: Direction) -> Self {
            match direction {
                Direction::Up => conversation::HistoryDirection::Up,
                Direction::Down => conversation::HistoryDirection::Down,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct NavigateHistory {
        pub direction: Direction,
    }

    #[derive(Serialize, Debug)]
    pub struct HistoryEntry {
        pub entry: String,
    }
}
