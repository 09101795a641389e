//! Port for purchase persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewPurchase, Purchase, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by purchase repository adapters.
    pub enum PurchasePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "purchase repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "purchase repository query failed: {message}",
    }
}

impl From<PurchasePersistenceError> for crate::domain::Error {
    fn from(value: PurchasePersistenceError) -> Self {
        match value {
            PurchasePersistenceError::Connection { message } => {
                Self::service_unavailable(format!("purchase repository unavailable: {message}"))
            }
            PurchasePersistenceError::Query { message } => {
                Self::internal(format!("purchase repository error: {message}"))
            }
        }
    }
}

/// Port for purchase storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Record a purchase.
    async fn insert(&self, purchase: &NewPurchase) -> Result<Purchase, PurchasePersistenceError>;

    /// Most recent purchases for one user.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Purchase>, PurchasePersistenceError>;
}

/// In-memory repository used by tests and database-less development runs.
#[derive(Debug, Default)]
pub struct InMemoryPurchaseRepository {
    rows: Mutex<Vec<Purchase>>,
}

impl InMemoryPurchaseRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Purchase>>, PurchasePersistenceError> {
        self.rows
            .lock()
            .map_err(|_| PurchasePersistenceError::query("purchase store poisoned"))
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn insert(&self, purchase: &NewPurchase) -> Result<Purchase, PurchasePersistenceError> {
        let stored = Purchase {
            id: Uuid::new_v4(),
            user_id: purchase.user_id,
            game_id: purchase.game_id.clone(),
            game_title: purchase.game_title.clone(),
            image_url: purchase.image_url.clone(),
            genre: purchase.genre.clone(),
            price: purchase.price,
            store: purchase.store.clone(),
            purchased_at: Utc::now(),
        };
        self.lock()?.push(stored.clone());
        Ok(stored)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Purchase>, PurchasePersistenceError> {
        let mut rows: Vec<Purchase> = self
            .lock()?
            .iter()
            .filter(|row| &row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        rows.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(rows)
    }
}
