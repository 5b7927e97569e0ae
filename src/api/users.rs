use crate::context::AppContext;
use crate::services::{upload_service, user_service};
use crate::services::user_service::{UploadResponse, UserListResponse, UserLookupResponse};
use crate::utils::error::{AppError, ErrorResponse};
use crate::utils::validation;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

/// Multipart body of `POST /api/upload` (documentation only)
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadForm {
    pub name: String,
    pub email: String,
    /// jpeg, png, gif or webp, at most 5MB
    #[schema(value_type = String, format = Binary)]
    pub profile_picture: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Users",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Profile created or updated", body = UploadResponse),
        (status = 400, description = "Missing file, missing fields or invalid image", body = ErrorResponse),
        (status = 413, description = "File larger than 5MB", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    )
)]
#[post("/upload")]
pub async fn upload_profile(
    ctx: web::Data<AppContext>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    log::info!("📤 POST /api/upload");

    let form = upload_service::read_upload_form(payload).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::InvalidRequest(upload_service::MSG_MISSING_FILE.to_string()))?;

    let (name, email) = validation::validate_profile_fields(
        form.name.as_deref().unwrap_or_default(),
        form.email.as_deref().unwrap_or_default(),
    )?;

    let stored = upload_service::receive_profile_picture(&ctx.uploads, &file).await?;

    let file_url = {
        let conn = req.connection_info();
        stored.public_url(conn.scheme(), conn.host())
    };

    match user_service::upsert_profile(ctx.users.as_ref(), &name, &email, &file_url).await {
        Ok(response) => Ok(HttpResponse::Created().json(response)),
        Err(e) => {
            ctx.uploads.discard(&stored).await;
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/user/{email}",
    tag = "Users",
    params(
        ("email" = String, Path, description = "Exact email of the user")
    ),
    responses(
        (status = 200, description = "User found", body = UserLookupResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    )
)]
#[get("/user/{email}")]
pub async fn get_user(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    log::info!("🔍 GET /api/user/{}", email);

    let response = user_service::get_user_by_email(ctx.users.as_ref(), &email).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users, newest first", body = UserListResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    )
)]
#[get("/users")]
pub async fn list_users(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /api/users");

    let response = user_service::list_users(ctx.users.as_ref()).await?;
    Ok(HttpResponse::Ok().json(response))
}
