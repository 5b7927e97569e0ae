use crate::database::UserStore;
use crate::services::upload_service::UploadStore;
use std::sync::Arc;

/// Process-wide dependencies handed to every handler via `web::Data`
pub struct AppContext {
    pub users: Arc<dyn UserStore>,
    pub uploads: UploadStore,
}

impl AppContext {
    pub fn new(users: Arc<dyn UserStore>, uploads: UploadStore) -> Self {
        Self { users, uploads }
    }
}
