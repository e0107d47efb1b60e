// Token acquisition endpoints: sign-up, sign-in, update-token

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, password, TokenKind, TokenPair};
use crate::config;
use crate::database::{tokens, users, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Rules for new accounts. Sign-in only requires both fields to be present.
    fn validate_new_account(&self) -> Result<(), ApiError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("Incorrect data input"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ApiError::bad_request(format!(
                "username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user_id: i32,
    pub message: &'static str,
}

/// POST /sign-up - create an account
pub async fn sign_up(payload: Result<Json<CredentialsRequest>, JsonRejection>) -> ApiResult<SignUpResponse> {
    let Json(input) = payload?;
    input.validate_new_account()?;

    let username = input.username.trim();
    let cost = config::config().security.bcrypt_cost;
    let password_hash = password::hash_password(input.password.clone(), cost).await?;

    let pool = DatabaseManager::main_pool().await?;
    let user_id = users::create_user(&pool, username, &password_hash).await?;

    tracing::info!("Registered user '{}' (id {})", username, user_id);

    Ok(ApiResponse::created(SignUpResponse {
        user_id,
        message: "user successfully created",
    }))
}

/// POST /sign-in - check credentials and issue a token pair
pub async fn sign_in(payload: Result<Json<CredentialsRequest>, JsonRejection>) -> ApiResult<TokenPair> {
    let Json(input) = payload?;

    let username = input.username.trim();
    if username.is_empty() || input.password.is_empty() {
        return Err(ApiError::bad_request("Incorrect data input"));
    }

    let pool = DatabaseManager::main_pool().await?;

    let user = match users::find_user_by_username(&pool, username).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Sign-in attempt for unknown user '{}'", username);
            return Err(ApiError::unauthorized("Incorrect username or password"));
        }
    };

    if !password::verify_password(input.password, user.password_hash).await? {
        tracing::warn!("Sign-in attempt with wrong password for '{}'", username);
        return Err(ApiError::unauthorized("Incorrect username or password"));
    }

    let pair = auth::issuer().issue_pair(user.user_id)?;
    tokens::insert_token_pair(&pool, user.user_id, &pair.access_token, &pair.refresh_token).await?;

    tracing::info!("User '{}' signed in", username);
    Ok(ApiResponse::success(pair))
}

/// POST /update-token - exchange a refresh token for a fresh pair
pub async fn update_token(payload: Result<Json<TokenPair>, JsonRejection>) -> ApiResult<TokenPair> {
    let Json(input) = payload?;

    if input.access_token.trim().is_empty() || input.refresh_token.trim().is_empty() {
        return Err(ApiError::bad_request("Incorrect data input"));
    }

    let issuer = auth::issuer();
    let claims = issuer
        .validate(&input.refresh_token, TokenKind::Refresh)
        .map_err(|e| match e {
            auth::TokenError::Expired => ApiError::token_expired("refresh token expired"),
            other => ApiError::from(other),
        })?;

    let pool = DatabaseManager::main_pool().await?;
    let pair = issuer.issue_pair(claims.sub)?;

    let rotated = tokens::rotate_token_pair(
        &pool,
        claims.sub,
        &input.access_token,
        &input.refresh_token,
        &pair.access_token,
        &pair.refresh_token,
    )
    .await?;

    if !rotated {
        return Err(ApiError::unauthorized("there are no such tokens"));
    }

    tracing::debug!("Rotated token pair for user {}", claims.sub);
    Ok(ApiResponse::success(pair))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn new_account_rules() {
        assert!(creds("alice", "secret1").validate_new_account().is_ok());
        assert!(creds("  ", "secret1").validate_new_account().is_err());
        assert!(creds("alice", "").validate_new_account().is_err());
        assert!(creds("alice", "short").validate_new_account().is_err());
        assert!(creds(&"a".repeat(MAX_USERNAME_LEN + 1), "secret1").validate_new_account().is_err());
    }
}
