//! Port for wishlist persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewWishlistEntry, UserId, WishlistEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wishlist repository adapters.
    pub enum WishlistPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "wishlist repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "wishlist repository query failed: {message}",
        /// The game is already on the user's wishlist.
        Duplicate { game_id: String } =>
            "game {game_id} is already wishlisted",
    }
}

impl From<WishlistPersistenceError> for crate::domain::Error {
    fn from(value: WishlistPersistenceError) -> Self {
        match value {
            WishlistPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("wishlist repository unavailable: {message}"))
            }
            WishlistPersistenceError::Query { message } => {
                Self::internal(format!("wishlist repository error: {message}"))
            }
            WishlistPersistenceError::Duplicate { game_id } => {
                Self::conflict(format!("game {game_id} is already wishlisted"))
            }
        }
    }
}

/// Port for wishlist storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Entries for one user, most recently added first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<WishlistEntry>, WishlistPersistenceError>;

    /// Just the game ids for one user, for quick membership checks.
    async fn game_ids_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<String>, WishlistPersistenceError>;

    /// Add an entry; duplicates per `(user, game)` are rejected.
    async fn insert(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<WishlistEntry, WishlistPersistenceError>;

    /// Remove an entry; returns `false` when absent.
    async fn remove(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError>;

    /// Whether the game is wishlisted by the user.
    async fn contains(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError>;

    /// Number of entries for one user.
    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, WishlistPersistenceError>;
}

/// In-memory repository used by tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryWishlistRepository {
    rows: Mutex<Vec<WishlistEntry>>,
}

impl InMemoryWishlistRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Vec<WishlistEntry>>, WishlistPersistenceError> {
        self.rows
            .lock()
            .map_err(|_| WishlistPersistenceError::query("wishlist store poisoned"))
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<WishlistEntry>, WishlistPersistenceError> {
        let mut rows: Vec<WishlistEntry> = self
            .lock()?
            .iter()
            .filter(|row| &row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(rows)
    }

    async fn game_ids_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<String>, WishlistPersistenceError> {
        Ok(self
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|row| row.game_id)
            .collect())
    }

    async fn insert(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<WishlistEntry, WishlistPersistenceError> {
        let mut rows = self.lock()?;
        if rows
            .iter()
            .any(|row| row.user_id == entry.user_id && row.game_id == entry.game_id)
        {
            return Err(WishlistPersistenceError::duplicate(entry.game_id.clone()));
        }

        let stored = WishlistEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            game_id: entry.game_id.clone(),
            game_title: entry.game_title.clone(),
            image_url: entry.image_url.clone(),
            price: entry.price,
            original_price: entry.original_price,
            discount_percent: entry.discount_percent,
            store_id: entry.store_id.clone(),
            deal_id: entry.deal_id.clone(),
            added_at: Utc::now(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|row| !(&row.user_id == user_id && row.game_id == game_id));
        Ok(rows.len() != before)
    }

    async fn contains(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .any(|row| &row.user_id == user_id && row.game_id == game_id))
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, WishlistPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|row| &row.user_id == user_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory repository.
    use super::*;

    fn entry(user_id: UserId, game_id: &str) -> NewWishlistEntry {
        NewWishlistEntry {
            user_id,
            game_id: game_id.to_owned(),
            game_title: format!("Game {game_id}"),
            image_url: None,
            price: Some(4.99),
            original_price: Some(19.99),
            discount_percent: Some(75),
            store_id: Some("1".to_owned()),
            deal_id: Some("deal".to_owned()),
        }
    }

    #[tokio::test]
    async fn duplicate_entries_are_rejected() {
        let repo = InMemoryWishlistRepository::new();
        let user = UserId::random();

        repo.insert(&entry(user, "cs_612")).await.expect("insert");
        let err = repo
            .insert(&entry(user, "cs_612"))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, WishlistPersistenceError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn listings_are_scoped_per_user() {
        let repo = InMemoryWishlistRepository::new();
        let ada = UserId::random();
        let grace = UserId::random();

        repo.insert(&entry(ada, "cs_1")).await.expect("insert");
        repo.insert(&entry(ada, "cs_2")).await.expect("insert");
        repo.insert(&entry(grace, "cs_3")).await.expect("insert");

        let ids = repo.game_ids_for_user(&ada).await.expect("ids");
        assert_eq!(ids.len(), 2);
        assert_eq!(repo.count_for_user(&grace).await.expect("count"), 1);
        assert!(repo.contains(&ada, "cs_1").await.expect("contains"));
        assert!(!repo.contains(&grace, "cs_1").await.expect("contains"));
    }

    #[tokio::test]
    async fn remove_reports_absent_entries() {
        let repo = InMemoryWishlistRepository::new();
        let user = UserId::random();
        repo.insert(&entry(user, "cs_612")).await.expect("insert");

        assert!(repo.remove(&user, "cs_612").await.expect("remove"));
        assert!(!repo.remove(&user, "cs_612").await.expect("second remove"));
    }
}
