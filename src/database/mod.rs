mod user_store;
#[cfg(test)]
mod memory;

pub use user_store::*;
#[cfg(test)]
pub use memory::MemoryUserStore;

use crate::models::USERS_COLLECTION;
use mongodb::{Client, Collection, Database};
use std::error::Error;

const DEFAULT_DB_NAME: &str = "profile_upload";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db = client.database(&database_name(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the users collection relies on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        // users(email) UNIQUE - one profile per email, backs the atomic upsert
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => {
                // Usually means duplicate emails from before the index existed
                log::warn!("   ⚠️  Could not create users(email) unique index: {}", e);
            }
        }

        // users(createdAt desc) - newest-first listing
        let created_index = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .build();

        match users.create_index(created_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Extracts the database name from the URI path, e.g.
/// `mongodb://host:27017/profiles?retryWrites=true` -> `profiles`.
fn database_name(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/profiles"), "profiles");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster.example.net/app?retryWrites=true&w=majority"),
            "app"
        );
    }

    #[test]
    fn test_database_name_defaults() {
        assert_eq!(database_name("mongodb://localhost:27017"), DEFAULT_DB_NAME);
        assert_eq!(database_name("mongodb://localhost:27017/"), DEFAULT_DB_NAME);
        assert_eq!(database_name("mongodb://localhost:27017/?directConnection=true"), DEFAULT_DB_NAME);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/profile_upload_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
