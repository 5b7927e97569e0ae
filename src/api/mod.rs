pub mod health;
pub mod swagger;
pub mod users;

use crate::context::AppContext;
use crate::services::upload_service::PUBLIC_PREFIX;
use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Registers every route plus the shared `AppContext`
pub fn configure(cfg: &mut web::ServiceConfig, ctx: web::Data<AppContext>) {
    let upload_root = ctx.uploads.root().to_path_buf();

    cfg.app_data(ctx)
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url("/api-docs/openapi.json", swagger::ApiDoc::openapi()),
        )
        .route("/", web::get().to(health::liveness))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(users::upload_profile)
                .service(users::get_user)
                .service(users::list_users),
        )
        .service(actix_files::Files::new(PUBLIC_PREFIX, upload_root));
}
