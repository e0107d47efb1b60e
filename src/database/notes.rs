use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::Note;

/// Insert a note and return the id PostgreSQL assigned to it
pub async fn insert_note(pool: &PgPool, user_id: i32, note: &str) -> Result<i32, DatabaseError> {
    let note_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO notes (user_id, note) VALUES ($1, $2) RETURNING note_id",
    )
    .bind(user_id)
    .bind(note)
    .fetch_one(pool)
    .await?;

    Ok(note_id)
}

pub async fn note_owner(pool: &PgPool, note_id: i32) -> Result<Option<i32>, DatabaseError> {
    let user_id = sqlx::query_scalar::<_, i32>("SELECT user_id FROM notes WHERE note_id = $1")
        .bind(note_id)
        .fetch_optional(pool)
        .await?;

    Ok(user_id)
}

pub async fn update_note(pool: &PgPool, note_id: i32, user_id: i32, note: &str) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE notes SET note = $1, updated_at = now() WHERE note_id = $2 AND user_id = $3",
    )
    .bind(note)
    .bind(note_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_note(pool: &PgPool, note_id: i32, user_id: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM notes WHERE note_id = $1 AND user_id = $2")
        .bind(note_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn notes_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Note>, DatabaseError> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT note_id, note, created_at, updated_at
         FROM notes
         WHERE user_id = $1
         ORDER BY note_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}
