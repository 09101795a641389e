//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel row structs and
//! domain types; no business logic lives here. Row structs (`models`) and
//! table definitions (`schema`) are internal implementation details.

mod diesel_purchase_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod diesel_wishlist_repository;
mod models;
mod pool;
mod schema;

pub use diesel_purchase_repository::DieselPurchaseRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_wishlist_repository::DieselWishlistRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

/// SQL migrations bundled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending migrations against the configured database.
///
/// Uses a short-lived synchronous connection; called once at startup before
/// the async pool is built.
pub fn run_pending_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(format!("migration connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| PoolError::build(format!("migrations failed: {err}")))
}
