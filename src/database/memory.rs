use crate::database::UserStore;
use crate::models::User;
use crate::utils::error::AppError;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory `UserStore` for handler tests
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    failing: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a database error until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("connection refused (memory store)".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert_by_email(
        &self,
        name: &str,
        email: &str,
        profile_picture: &str,
    ) -> Result<User, AppError> {
        self.check()?;
        let now = DateTime::now();
        let mut users = self.users.lock().unwrap();

        if let Some(existing) = users.iter_mut().find(|u| u.email == email) {
            existing.name = name.to_string();
            existing.profile_picture = profile_picture.to_string();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let user = User {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            email: email.to_string(),
            profile_picture: profile_picture.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<User>, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap().clone();
        // Later inserts win ties on equal millisecond timestamps
        users.reverse();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryUserStore::new();

        let first = store.upsert_by_email("Ann", "a@x.com", "http://h/1.png").await.unwrap();
        let second = store.upsert_by_email("Annie", "a@x.com", "http://h/2.png").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.name, "Annie");
        assert_eq!(second.profile_picture, "http://h/2.png");
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryUserStore::new();
        store.set_failing(true);
        assert!(store.find_by_email("a@x.com").await.is_err());
        store.set_failing(false);
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }
}
