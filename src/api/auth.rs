//! Registration and login endpoints

use crate::core::traits::{AuthError, AuthService};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    Inject(auth_service): Inject<dyn AuthService>,
    Json(request): Json<schemas::RegisterRequest>,
) -> (StatusCode, Json<schemas::AuthResponse>) {
    if request.name.is_empty()
        || request.email.is_empty()
        || request.password.is_empty()
        || request.confirm_password.is_empty()
    {
        return failure(StatusCode::BAD_REQUEST, "All fields are required");
    }
    if request.password != request.confirm_password {
        return failure(StatusCode::BAD_REQUEST, "Passwords do not match");
    }
    if request.password.len() < 6 {
        return failure(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters long",
        );
    }

    match auth_service
        .register(&request.name, &request.email, &request.password)
        .await
    {
        Ok((user, token)) => success(user, token),
        Err(AuthError::DuplicateEmail) => failure(
            StatusCode::CONFLICT,
            "User with this email already exists",
        ),
        Err(AuthError::InvalidCredentials) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn login(
    Inject(auth_service): Inject<dyn AuthService>,
    Json(request): Json<schemas::LoginRequest>,
) -> (StatusCode, Json<schemas::AuthResponse>) {
    if request.email.is_empty() || request.password.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    match auth_service.login(&request.email, &request.password).await {
        Ok((user, token)) => success(user, token),
        Err(_) => failure(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

fn success(
    user: crate::infrastructure::entities::User,
    token: String,
) -> (StatusCode, Json<schemas::AuthResponse>) {
    (
        StatusCode::OK,
        Json(schemas::AuthResponse {
            success: true,
            user: Some(user.into()),
            token: Some(token),
            message: None,
        }),
    )
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<schemas::AuthResponse>) {
    (
        status,
        Json(schemas::AuthResponse {
            success: false,
            user: None,
            token: None,
            message: Some(message.to_owned()),
        }),
    )
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct RegisterRequest {
        pub name: String,
        pub email: String,
        pub password: String,
        pub confirm_password: String,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    /// The stored password hash never crosses this boundary.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::User> for User {
        fn from(user: entities::User) -> Self {
            User {
                id: user.id,
                name: user.name,
                email: user.email,
                created_at: user.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct AuthResponse {
        pub success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user: Option<User>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub token: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }
}
