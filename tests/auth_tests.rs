//! Unit tests for API authentication extractor

use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use tokio_gemini_chat_api::api::ExtractUser;
use tokio_gemini_chat_api::core::auth;
use uuid::Uuid;

#[tokio::test]
async fn test_extract_user_valid_token() {
    let user_id = Uuid::new_v4();
    let token = auth::generate_token(user_id);
    let req = Request::builder()
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractUser::from_request_parts(&mut parts, &()).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().0, user_id);
}

#[tokio::test]
async fn test_extract_user_missing_header() {
    let req = Request::builder().body(()).unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractUser::from_request_parts(&mut parts, &()).await;

    assert!(result.is_err());
    let (status, message) = result.unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(message.contains("missing"));
}

#[tokio::test]
async fn test_extract_user_wrong_scheme() {
    let req = Request::builder()
        .header("Authorization", "Token abc123")
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractUser::from_request_parts(&mut parts, &()).await;

    assert!(result.is_err());
    let (status, message) = result.unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(message.contains("bearer"));
}

#[tokio::test]
async fn test_extract_user_garbage_token() {
    let req = Request::builder()
        .header("Authorization", "Bearer not-a-real-token")
        .body(())
        .unwrap();

    let (mut parts, _) = req.into_parts();
    let result = ExtractUser::from_request_parts(&mut parts, &()).await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extract_user_invalid_utf8() {
    use axum::http::HeaderValue;

    let req = Request::builder().body(()).unwrap();
    let (mut parts, _) = req.into_parts();
    parts
        .headers
        .insert("Authorization", HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap());

    let result = ExtractUser::from_request_parts(&mut parts, &()).await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().0, StatusCode::UNAUTHORIZED);
}
