use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

pub mod auth;
pub mod chat;
pub mod conversations;

/// Authenticated user id, extracted from a `Bearer` token.
///
/// Verification fails closed: a missing header, a non-bearer scheme, or an
/// invalid/expired token all reject with 401.
#[derive(Debug)]
pub struct ExtractUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or((StatusCode::UNAUTHORIZED, "`Authorization` header is missing"))?;
        let header = header
            .to_str()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "expected a bearer token"))?;

        match crate::core::auth::verify_token(token) {
            Some(user_id) => Ok(ExtractUser(user_id)),
            None => Err((StatusCode::UNAUTHORIZED, "invalid or expired token")),
        }
    }
}
