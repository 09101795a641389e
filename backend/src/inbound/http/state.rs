//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Accounts, CatalogQuery, PurchaseRepository, ReviewRepository, UserRepository,
    WishlistRepository,
};
use crate::inbound::http::token::TokenCodec;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub users: Arc<dyn UserRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub wishlist: Arc<dyn WishlistRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub tokens: TokenCodec,
}

/// Parameter object bundling all port implementations for HTTP handlers.
pub struct HttpStatePorts {
    pub accounts: Arc<dyn Accounts>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub users: Arc<dyn UserRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub wishlist: Arc<dyn WishlistRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
}

impl HttpState {
    /// Construct state from a ports bundle and token codec.
    pub fn new(ports: HttpStatePorts, tokens: TokenCodec) -> Self {
        let HttpStatePorts {
            accounts,
            catalog,
            users,
            reviews,
            wishlist,
            purchases,
        } = ports;
        Self {
            accounts,
            catalog,
            users,
            reviews,
            wishlist,
            purchases,
            tokens,
        }
    }

    /// In-memory state for tests and database-less development runs.
    pub fn in_memory(secret: &str) -> Self {
        use crate::domain::ports::{
            FixtureDealsSource, FixtureGameCatalogSource, FixtureGenreEnrichmentSource,
            FixtureGoogleTokenVerifier, InMemoryPurchaseRepository, InMemoryReviewRepository,
            InMemoryUserRepository, InMemoryWishlistRepository,
        };
        use crate::domain::{AccountsService, CatalogService};

        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let accounts = Arc::new(AccountsService::new(
            users.clone(),
            Arc::new(FixtureGoogleTokenVerifier),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::new(FixtureDealsSource),
            Arc::new(FixtureGameCatalogSource),
            Some(Arc::new(FixtureGenreEnrichmentSource)),
        ));

        Self::new(
            HttpStatePorts {
                accounts,
                catalog,
                users,
                reviews: Arc::new(InMemoryReviewRepository::new()),
                wishlist: Arc::new(InMemoryWishlistRepository::new()),
                purchases: Arc::new(InMemoryPurchaseRepository::new()),
            },
            TokenCodec::new(secret),
        )
    }
}
