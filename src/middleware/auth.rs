use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, TokenKind};
use crate::database::{tokens, DatabaseManager};
use crate::error::ApiError;

/// Header the web client sends the access token in
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// Authenticated caller, injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub access_token: String,
}

/// Validates the access token on every protected route:
/// present, on record, a live access JWT. Injects the owning user.
pub async fn access_token_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_access_token(&headers).map_err(ApiError::unauthorized)?;

    let pool = DatabaseManager::main_pool().await?;

    if !tokens::token_exists(&pool, &token).await? {
        tracing::debug!("Rejected access token that is not on record");
        return Err(ApiError::unauthorized("The user is not authorized!"));
    }

    auth::issuer().validate(&token, TokenKind::Access)?;

    let user_id = tokens::token_owner(&pool, &token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("The user is not authorized!"))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        access_token: token,
    });

    Ok(next.run(request).await)
}

/// Read the token from the `access_token` header, falling back to `Authorization: Bearer`
fn extract_access_token(headers: &HeaderMap) -> Result<String, &'static str> {
    if let Some(value) = headers.get(ACCESS_TOKEN_HEADER) {
        let token = value.to_str().map_err(|_| "Incorrect header input")?.trim();
        if token.is_empty() {
            return Err("Incorrect header input");
        }
        return Ok(token.to_string());
    }

    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Incorrect header input")?
        .to_str()
        .map_err(|_| "Incorrect header input")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err("Incorrect header input"),
    }
}
