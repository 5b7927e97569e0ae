// ==================== USER PROFILES ====================
// Upsert and lookups over the UserStore, shaped into API responses.

use crate::database::UserStore;
use crate::models::UserResponse;
use crate::utils::error::AppError;
use serde::{Deserialize, Serialize};

pub const MSG_UPLOADED: &str = "Profile picture uploaded successfully";
pub const MSG_USER_NOT_FOUND: &str = "User not found";

// ==================== RESPONSE MODELS ====================

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserLookupResponse {
    pub success: bool,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserResponse>,
}

// ==================== SERVICE FUNCTIONS ====================

/// Creates the profile for `email`, or replaces its name and picture.
pub async fn upsert_profile(
    store: &dyn UserStore,
    name: &str,
    email: &str,
    profile_picture: &str,
) -> Result<UploadResponse, AppError> {
    let user = store.upsert_by_email(name, email, profile_picture).await?;

    log::info!("✅ Profile saved for {}", email);

    Ok(UploadResponse {
        success: true,
        message: MSG_UPLOADED.to_string(),
        user: user.into(),
    })
}

pub async fn get_user_by_email(
    store: &dyn UserStore,
    email: &str,
) -> Result<UserLookupResponse, AppError> {
    let user = store
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.to_string()))?;

    Ok(UserLookupResponse {
        success: true,
        user: user.into(),
    })
}

pub async fn list_users(store: &dyn UserStore) -> Result<UserListResponse, AppError> {
    let users: Vec<UserResponse> = store
        .list_newest_first()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(UserListResponse {
        success: true,
        count: users.len(),
        users,
    })
}
