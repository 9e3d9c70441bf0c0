use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::env;
use uuid::Uuid;

use crate::error::ApiError;

/// Container for the authenticated user's id stored in request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Uuid);

/// Claims expected inside the JWT for authenticated users.
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Subject - should be the user's UUID as a string.
    pub sub: String,
    pub exp: usize,
}

/// Middleware to validate a Bearer JWT in the `Authorization` header.
///
/// On success the request is forwarded with a [`CurrentUser`] extension
/// attached; on failure a `401` is returned.
pub async fn jwt_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let auth_header = req.headers().get("authorization");
    let token = match auth_header.and_then(|v| v.to_str().ok()) {
        Some(s) if s.starts_with("Bearer ") => &s[7..],
        _ => return Err(ApiError::Unauthorized),
    };

    let secret = env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let decoded = decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
        .map_err(|_| ApiError::Unauthorized)?
        .claims;

    // Subject must parse as a UUID; anything else is treated as no identity.
    let user_id = Uuid::parse_str(&decoded.sub).map_err(|_| ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}
