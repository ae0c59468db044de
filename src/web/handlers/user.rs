//! User handlers.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::app::AppContext;
use crate::file::FileRepository;
use crate::web::dto::{ApiResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentUser;

/// GET /me - The logged-in user.
pub async fn me(
    State(ctx): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let used = FileRepository::new(ctx.db.pool())
        .total_size_by_owner(user.id)
        .await?;
    Ok(Json(ApiResponse::new(UserResponse::new(user, used))))
}
