// Note CRUD for the authenticated caller

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::database::{notes, DatabaseManager, Note};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub note_id: i32,
    pub new_note: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNoteRequest {
    pub note_id: i32,
}

#[derive(Debug, Serialize)]
pub struct NoteCreated {
    pub note_id: i32,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NoteList {
    pub notes: Vec<Note>,
}

impl AddNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.note.is_empty() {
            return Err(ApiError::bad_request("Incorrect data input"));
        }
        Ok(())
    }
}

impl UpdateNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.new_note.is_empty() || self.note_id <= 0 {
            return Err(ApiError::bad_request("Incorrect data input"));
        }
        Ok(())
    }
}

impl DeleteNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.note_id <= 0 {
            return Err(ApiError::bad_request("Incorrect data input"));
        }
        Ok(())
    }
}

/// The note must exist and belong to the caller
async fn ensure_owner(pool: &PgPool, note_id: i32, user: &AuthUser) -> Result<(), ApiError> {
    match notes::note_owner(pool, note_id).await? {
        None => Err(ApiError::bad_request("there is no such note")),
        Some(owner) if owner != user.user_id => {
            tracing::warn!("User {} tried to touch note {} owned by {}", user.user_id, note_id, owner);
            Err(ApiError::bad_request("the user id does not match"))
        }
        Some(_) => Ok(()),
    }
}

/// POST /add-note
pub async fn add_note(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<AddNoteRequest>, JsonRejection>,
) -> ApiResult<NoteCreated> {
    let Json(input) = payload?;
    input.validate()?;

    let pool = DatabaseManager::main_pool().await?;
    let note_id = notes::insert_note(&pool, user.user_id, &input.note).await?;

    tracing::debug!("User {} added note {}", user.user_id, note_id);
    Ok(ApiResponse::created(NoteCreated {
        note_id,
        message: "note successful added",
    }))
}

/// POST /update-note
pub async fn update_note(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(input) = payload?;
    input.validate()?;

    let pool = DatabaseManager::main_pool().await?;
    ensure_owner(&pool, input.note_id, &user).await?;

    if notes::update_note(&pool, input.note_id, user.user_id, &input.new_note).await? == 0 {
        // Deleted between the ownership check and the update
        return Err(ApiError::bad_request("there is no such note"));
    }

    Ok(ApiResponse::success(Message {
        message: "note was updated",
    }))
}

/// POST /delete-note
pub async fn delete_note(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<DeleteNoteRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(input) = payload?;
    input.validate()?;

    let pool = DatabaseManager::main_pool().await?;
    ensure_owner(&pool, input.note_id, &user).await?;

    if notes::delete_note(&pool, input.note_id, user.user_id).await? == 0 {
        return Err(ApiError::bad_request("there is no such note"));
    }

    Ok(ApiResponse::success(Message {
        message: "note was deleted",
    }))
}

/// GET /get-all-notes
pub async fn get_all_notes(Extension(user): Extension<AuthUser>) -> ApiResult<NoteList> {
    let pool = DatabaseManager::main_pool().await?;
    let notes = notes::notes_for_user(&pool, user.user_id).await?;

    Ok(ApiResponse::success(NoteList { notes }))
}
