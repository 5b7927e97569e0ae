pub mod upload_service;
pub mod user_service;
