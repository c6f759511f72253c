//! Password hashing and bearer-token issuance.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::LazyLock;
use uuid::Uuid;

const TOKEN_TTL_DAYS: i64 = 7;

static JWT_SECRET: LazyLock<String> = LazyLock::new(|| {
    env::var("JWT_SECRET").unwrap_or_else(|_| "your-secret-key-change-in-production".to_owned())
});

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing should not fail")
        .to_string()
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Signs a bearer token for the given user, valid for seven days.
pub fn generate_token(user_id: Uuid) -> String {
    let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    sign_token(user_id, expires_at.timestamp())
}

fn sign_token(user_id: Uuid, expires_at: i64) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires_at,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("HMAC token signing should not fail")
}

/// Verifies a bearer token, failing closed: malformed, mis-signed, or
/// expired tokens all read as unauthenticated.
pub fn verify_token(token: &str) -> Option<Uuid> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}
