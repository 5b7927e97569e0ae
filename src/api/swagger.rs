use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Profile Upload API",
        version = "0.1.0",
        description = "Collects a name, email and profile picture per user. \
            Uploading again with the same email replaces the name and picture.",
    ),
    paths(
        crate::api::health::liveness,
        crate::api::health::health_check,

        crate::api::users::upload_profile,
        crate::api::users::get_user,
        crate::api::users::list_users,
    ),
    components(
        schemas(
            crate::api::health::LivenessResponse,
            crate::api::health::HealthResponse,

            crate::api::users::UploadForm,
            crate::models::UserResponse,
            crate::services::user_service::UploadResponse,
            crate::services::user_service::UserLookupResponse,
            crate::services::user_service::UserListResponse,
            crate::utils::error::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and health checks."),
        (name = "Users", description = "Profile picture upload and user lookup."),
    )
)]
pub struct ApiDoc;
