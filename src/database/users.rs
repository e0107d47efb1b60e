use sqlx::PgPool;

use super::manager::{conflict_on_unique, DatabaseError};
use super::models::User;

/// Insert a new user and return its id
pub async fn create_user(pool: &PgPool, username: &str, password_hash: &str) -> Result<i32, DatabaseError> {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING user_id",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "a user with this username already exists"))
}

pub async fn find_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, password_hash, created_at
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
