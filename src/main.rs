mod api;
mod config;
mod context;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

use crate::config::Config;
use crate::context::AppContext;
use crate::database::{MongoDB, MongoUserStore};
use crate::services::upload_service::UploadStore;

fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    log::info!("🚀 Starting Profile Upload Service...");
    log::info!("📁 Upload directory: {}", config.upload_dir.display());

    let uploads = UploadStore::new(&config.upload_dir)?;

    let db = MongoDB::new(&config.database_url)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;

    log::info!("✅ MongoDB connected successfully");

    let ctx = web::Data::new(AppContext::new(
        Arc::new(MongoUserStore::new(db)),
        uploads,
    ));

    if config.cors_origins.is_empty() {
        log::info!("🌍 CORS: any origin");
    } else {
        log::info!("🌍 CORS origins: {}", config.cors_origins.join(", "));
    }

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        let ctx = ctx.clone();

        App::new()
            .wrap(build_cors(&cors_origins))
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .configure(|cfg| api::configure(cfg, ctx))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
