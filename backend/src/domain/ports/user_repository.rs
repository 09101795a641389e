//! Port for user account persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// A uniqueness constraint was violated.
        Duplicate { message: String } =>
            "user already exists: {message}",
    }
}

impl From<UserPersistenceError> for crate::domain::Error {
    fn from(value: UserPersistenceError) -> Self {
        match value {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { .. } => Self::conflict("email already registered"),
        }
    }
}

/// Port for user account storage and retrieval.
///
/// Email uniqueness is enforced by implementations; violating inserts or
/// updates return [`UserPersistenceError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace an existing account row.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Delete an account; returns `false` when the id is unknown.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by login email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by linked Google subject id.
    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// List all accounts ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Stamp a successful login.
    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError>;

    /// Bump the purchase counter by one.
    async fn increment_purchase_count(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}

/// In-memory repository used by tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let rows = users
            .into_iter()
            .map(|user| (*user.id.as_uuid(), user))
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, User>>, UserPersistenceError> {
        self.rows
            .lock()
            .map_err(|_| UserPersistenceError::query("user store poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut rows = self.lock()?;
        if rows.values().any(|row| row.email == user.email) {
            return Err(UserPersistenceError::duplicate(user.email.as_ref()));
        }
        rows.insert(*user.id.as_uuid(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut rows = self.lock()?;
        if rows
            .values()
            .any(|row| row.email == user.email && row.id != user.id)
        {
            return Err(UserPersistenceError::duplicate(user.email.as_ref()));
        }
        match rows.get_mut(user.id.as_uuid()) {
            Some(row) => {
                *row = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query("user not found for update")),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock()?.remove(id.as_uuid()).is_some())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.get(id.as_uuid()).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|row| &row.email == email)
            .cloned())
    }

    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|row| row.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self.lock()?.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        match self.lock()?.get_mut(id.as_uuid()) {
            Some(row) => {
                row.last_login_at = Some(at);
                Ok(())
            }
            None => Err(UserPersistenceError::query("user not found for login stamp")),
        }
    }

    async fn increment_purchase_count(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        match self.lock()?.get_mut(id.as_uuid()) {
            Some(row) => {
                row.purchase_count += 1;
                Ok(())
            }
            None => Err(UserPersistenceError::query(
                "user not found for purchase count",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory repository.
    use super::*;

    fn user(email: &str) -> User {
        User::builder(
            UserId::random(),
            EmailAddress::new(email).expect("valid email"),
        )
        .build()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_emails() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("ada@example.com"))
            .await
            .expect("first insert");

        let err = repo
            .insert(&user("ada@example.com"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, UserPersistenceError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn lookups_cover_email_and_google_id() {
        let mut linked = user("grace@example.com");
        linked.google_id = Some("sub-42".to_owned());
        let repo = InMemoryUserRepository::with_users([linked.clone()]);

        let by_email = repo
            .find_by_email(&linked.email)
            .await
            .expect("lookup succeeds");
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(linked.id));

        let by_google = repo
            .find_by_google_id("sub-42")
            .await
            .expect("lookup succeeds");
        assert_eq!(by_google.map(|u| u.id), Some(linked.id));
    }

    #[tokio::test]
    async fn record_login_and_purchase_count_mutate_row() {
        let stored = user("ada@example.com");
        let repo = InMemoryUserRepository::with_users([stored.clone()]);

        let now = Utc::now();
        repo.record_login(&stored.id, now).await.expect("stamp");
        repo.increment_purchase_count(&stored.id)
            .await
            .expect("bump");

        let reloaded = repo
            .find_by_id(&stored.id)
            .await
            .expect("lookup succeeds")
            .expect("user present");
        assert_eq!(reloaded.last_login_at, Some(now));
        assert_eq!(reloaded.purchase_count, 1);
    }

    #[tokio::test]
    async fn delete_reports_unknown_ids() {
        let repo = InMemoryUserRepository::new();
        let removed = repo.delete(&UserId::random()).await.expect("delete runs");
        assert!(!removed);
    }
}
