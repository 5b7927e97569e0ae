use crate::database::MongoDB;
use crate::models::{User, USERS_COLLECTION};
use crate::utils::error::AppError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use mongodb::error::ErrorKind;
use mongodb::options::ReturnDocument;
use mongodb::Collection;

/// Persistence seam for user profiles.
///
/// Handlers only see this trait through `AppContext`, so tests can run the
/// full HTTP surface against an in-memory implementation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert-or-update keyed by exact email, as one atomic operation.
    /// `createdAt` is only written on insert; returns the stored document.
    async fn upsert_by_email(
        &self,
        name: &str,
        email: &str,
        profile_picture: &str,
    ) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All users, newest `createdAt` first
    async fn list_newest_first(&self) -> Result<Vec<User>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

pub struct MongoUserStore {
    db: MongoDB,
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        let users = db.collection::<User>(USERS_COLLECTION);
        Self { db, users }
    }

    async fn find_one_and_upsert(
        &self,
        name: &str,
        email: &str,
        profile_picture: &str,
    ) -> mongodb::error::Result<Option<User>> {
        let now = DateTime::now();

        self.users
            .find_one_and_update(
                doc! { "email": email },
                doc! {
                    "$set": {
                        "name": name,
                        "profilePicture": profile_picture,
                        "updatedAt": now,
                    },
                    "$setOnInsert": { "createdAt": now },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }
}

/// E11000: two upserts for the same unseen email raced on the unique index.
fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(e.kind.as_ref(), ErrorKind::Command(ce) if ce.code == 11000)
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn upsert_by_email(
        &self,
        name: &str,
        email: &str,
        profile_picture: &str,
    ) -> Result<User, AppError> {
        let result = match self.find_one_and_upsert(name, email, profile_picture).await {
            Err(e) if is_duplicate_key(&e) => {
                // The other writer inserted first, so this retry takes the update path
                log::debug!("🔁 Upsert for {} hit duplicate key, retrying", email);
                self.find_one_and_upsert(name, email, profile_picture).await?
            }
            other => other?,
        };

        result.ok_or_else(|| {
            AppError::DatabaseError(format!("Upsert for {} returned no document", email))
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn list_newest_first(&self) -> Result<Vec<User>, AppError> {
        let cursor = self
            .users
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;

        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
