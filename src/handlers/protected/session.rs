use axum::Extension;

use crate::database::{tokens, DatabaseManager};
use crate::error::ApiError;
use crate::handlers::protected::notes::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /log-out - forget the presenting token pair
pub async fn log_out(Extension(user): Extension<AuthUser>) -> ApiResult<Message> {
    let pool = DatabaseManager::main_pool().await?;

    if tokens::delete_token(&pool, &user.access_token).await? == 0 {
        return Err(ApiError::unauthorized("The user is not authorized!"));
    }

    tracing::info!("User {} logged out", user.user_id);
    Ok(ApiResponse::success(Message {
        message: "user logged out",
    }))
}
