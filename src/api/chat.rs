//! Chat and AI status endpoints

use crate::api::ExtractUser;
use crate::core::conversation::SubmitError;
use crate::core::traits::ChatService;
use crate::infrastructure::traits::CompletionProvider;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", post(send_message))
}

pub fn status_router() -> Router {
    Router::new().route("/status", get(ai_status))
}

/// Runs the full turn server-side. Provider failures are absorbed into
/// fallback text, so a well-formed request always gets 200 with some reply.
async fn send_message(
    Inject(chat_service): Inject<dyn ChatService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<schemas::ChatRequest>,
) -> Result<Json<schemas::ChatResponse>, (StatusCode, Json<schemas::ChatError>)> {
    match chat_service.send_message(current_user, &request.message).await {
        Ok(response) => Ok(Json(schemas::ChatResponse { response })),
        Err(SubmitError::EmptyInput) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Message is required",
        )),
        Err(SubmitError::TurnInFlight) => Err(error_response(
            StatusCode::CONFLICT,
            "A reply is already being generated for this conversation",
        )),
    }
}

async fn ai_status(
    Inject(provider): Inject<dyn CompletionProvider>,
) -> Json<schemas::AiStatus> {
    let service = provider.service_name().to_owned();
    if provider.is_available().await {
        Json(schemas::AiStatus {
            available: true,
            service,
            model: Some(provider.model_id().to_owned()),
            status: Some("Connected and ready".to_owned()),
            message: None,
        })
    } else {
        Json(schemas::AiStatus {
            available: false,
            service,
            model: None,
            status: None,
            message: Some(
                "Gemini API is not available. Please check your API key configuration."
                    .to_owned(),
            ),
        })
    }
}

fn error_response(
    status: StatusCode,
    message: &str,
) -> (StatusCode, Json<schemas::ChatError>) {
    (
        status,
        Json(schemas::ChatError {
            error: message.to_owned(),
        }),
    )
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    /// A missing `message` field reads as empty and is rejected by the
    /// orchestrator, matching the 400 contract.
    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct ChatRequest {
        pub message: String,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatResponse {
        pub response: String,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatError {
        pub error: String,
    }

    #[derive(Serialize, Debug)]
    pub struct AiStatus {
        pub available: bool,
        pub service: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub model: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }
}
