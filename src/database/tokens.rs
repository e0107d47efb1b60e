use sqlx::PgPool;

use super::manager::DatabaseError;

/// Store a freshly issued token pair for the user
pub async fn insert_token_pair(
    pool: &PgPool,
    user_id: i32,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO tokens (user_id, access_token, refresh_token) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(access_token)
        .bind(refresh_token)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn token_exists(pool: &PgPool, access_token: &str) -> Result<bool, DatabaseError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM tokens WHERE access_token = $1)",
    )
    .bind(access_token)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Owner of an access token, if the token is still on record
pub async fn token_owner(pool: &PgPool, access_token: &str) -> Result<Option<i32>, DatabaseError> {
    let user_id = sqlx::query_scalar::<_, i32>("SELECT user_id FROM tokens WHERE access_token = $1")
        .bind(access_token)
        .fetch_optional(pool)
        .await?;

    Ok(user_id)
}

/// Remove the row holding this access token. Returns the number of rows removed.
pub async fn delete_token(pool: &PgPool, access_token: &str) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM tokens WHERE access_token = $1")
        .bind(access_token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Replace a stored pair with a new one. `false` when the old pair is not on record for the user.
pub async fn rotate_token_pair(
    pool: &PgPool,
    user_id: i32,
    old_access: &str,
    old_refresh: &str,
    new_access: &str,
    new_refresh: &str,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE tokens
         SET access_token = $3, refresh_token = $4, created_at = now()
         WHERE access_token = $1 AND refresh_token = $2 AND user_id = $5",
    )
    .bind(old_access)
    .bind(old_refresh)
    .bind(new_access)
    .bind(new_refresh)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
