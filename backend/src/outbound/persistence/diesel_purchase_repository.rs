//! PostgreSQL-backed `PurchaseRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PurchasePersistenceError, PurchaseRepository};
use crate::domain::{NewPurchase, Purchase, UserId};

use super::models::{NewPurchaseRow, PurchaseRow};
use super::pool::{DbPool, PoolError};
use super::schema::purchases;

/// Diesel-backed implementation of the `PurchaseRepository` port.
#[derive(Clone)]
pub struct DieselPurchaseRepository {
    pool: DbPool,
}

impl DieselPurchaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PurchasePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PurchasePersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PurchasePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "diesel operation failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PurchasePersistenceError::connection("database connection error")
        }
        DieselError::NotFound => PurchasePersistenceError::query("record not found"),
        _ => PurchasePersistenceError::query("database error"),
    }
}

fn row_to_purchase(row: PurchaseRow) -> Purchase {
    Purchase {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        game_id: row.game_id,
        game_title: row.game_title,
        image_url: row.image_url,
        genre: row.genre,
        price: row.price,
        store: row.store,
        purchased_at: row.purchased_at,
    }
}

#[async_trait]
impl PurchaseRepository for DieselPurchaseRepository {
    async fn insert(&self, purchase: &NewPurchase) -> Result<Purchase, PurchasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPurchaseRow {
            id: Uuid::new_v4(),
            user_id: *purchase.user_id.as_uuid(),
            game_id: &purchase.game_id,
            game_title: &purchase.game_title,
            image_url: purchase.image_url.as_deref(),
            genre: purchase.genre.as_deref(),
            price: purchase.price,
            store: purchase.store.as_deref(),
        };

        let inserted: PurchaseRow = diesel::insert_into(purchases::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_purchase(inserted))
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<Purchase>, PurchasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PurchaseRow> = purchases::table
            .filter(purchases::user_id.eq(user_id.as_uuid()))
            .order(purchases::purchased_at.desc())
            .limit(limit)
            .select(PurchaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_purchase).collect())
    }
}
