//! PostgreSQL-backed `WishlistRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{WishlistPersistenceError, WishlistRepository};
use crate::domain::{NewWishlistEntry, UserId, WishlistEntry};

use super::models::{NewWishlistRow, WishlistRow};
use super::pool::{DbPool, PoolError};
use super::schema::wishlist_entries;

/// Diesel-backed implementation of the `WishlistRepository` port.
#[derive(Clone)]
pub struct DieselWishlistRepository {
    pool: DbPool,
}

impl DieselWishlistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WishlistPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            WishlistPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(game_id: &str, error: diesel::result::Error) -> WishlistPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "diesel operation failed");
    match error {
        // The (user_id, game_id) unique index backs the duplicate rule.
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            WishlistPersistenceError::duplicate(game_id)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            WishlistPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => WishlistPersistenceError::query("record not found"),
        _ => WishlistPersistenceError::query("database error"),
    }
}

fn row_to_entry(row: WishlistRow) -> WishlistEntry {
    WishlistEntry {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        game_id: row.game_id,
        game_title: row.game_title,
        image_url: row.image_url,
        price: row.price,
        original_price: row.original_price,
        discount_percent: row.discount_percent,
        store_id: row.store_id,
        deal_id: row.deal_id,
        added_at: row.added_at,
    }
}

#[async_trait]
impl WishlistRepository for DieselWishlistRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<WishlistEntry>, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<WishlistRow> = wishlist_entries::table
            .filter(wishlist_entries::user_id.eq(user_id.as_uuid()))
            .order(wishlist_entries::added_at.desc())
            .select(WishlistRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("", err))?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    async fn game_ids_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<String>, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        wishlist_entries::table
            .filter(wishlist_entries::user_id.eq(user_id.as_uuid()))
            .order(wishlist_entries::added_at.desc())
            .select(wishlist_entries::game_id)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("", err))
    }

    async fn insert(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<WishlistEntry, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewWishlistRow {
            id: Uuid::new_v4(),
            user_id: *entry.user_id.as_uuid(),
            game_id: &entry.game_id,
            game_title: &entry.game_title,
            image_url: entry.image_url.as_deref(),
            price: entry.price,
            original_price: entry.original_price,
            discount_percent: entry.discount_percent,
            store_id: entry.store_id.as_deref(),
            deal_id: entry.deal_id.as_deref(),
        };

        let inserted: WishlistRow = diesel::insert_into(wishlist_entries::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&entry.game_id, err))?;
        Ok(row_to_entry(inserted))
    }

    async fn remove(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            wishlist_entries::table.filter(
                wishlist_entries::user_id
                    .eq(user_id.as_uuid())
                    .and(wishlist_entries::game_id.eq(game_id)),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(game_id, err))?;
        Ok(deleted > 0)
    }

    async fn contains(
        &self,
        user_id: &UserId,
        game_id: &str,
    ) -> Result<bool, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = wishlist_entries::table
            .filter(
                wishlist_entries::user_id
                    .eq(user_id.as_uuid())
                    .and(wishlist_entries::game_id.eq(game_id)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(game_id, err))?;
        Ok(count > 0)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, WishlistPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = wishlist_entries::table
            .filter(wishlist_entries::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("", err))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error mapping.
    use super::*;

    #[test]
    fn unique_violations_map_to_duplicate_with_game_id() {
        let err = map_diesel_error(
            "cs_612",
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key".to_owned()),
            ),
        );
        assert!(matches!(
            err,
            WishlistPersistenceError::Duplicate { ref game_id } if game_id == "cs_612"
        ));
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(err, WishlistPersistenceError::Connection { .. }));
    }
}
