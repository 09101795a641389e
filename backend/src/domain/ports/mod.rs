//! Domain ports (hexagonal boundaries).
//!
//! Driving ports ([`Accounts`], [`CatalogQuery`]) are called by inbound
//! adapters; driven ports (repositories and upstream sources) are implemented
//! by outbound adapters. Fixture and in-memory implementations live next to
//! each port so tests and database-less runs stay deterministic.

mod macros;

mod accounts;
mod catalog_query;
mod deals_source;
mod game_catalog_source;
mod genre_enrichment_source;
mod purchase_repository;
mod review_repository;
mod token_verifier;
mod user_repository;
mod wishlist_repository;

pub(crate) use macros::define_port_error;

pub use accounts::{Accounts, RegistrationRequest};
pub use catalog_query::{
    CatalogPage, CatalogQuery, DealsPage, EtlRunSummary, GenreStatsReport, TopDealsQuery,
};
pub use deals_source::{DealRecord, DealsSource, DealsSourceError, FixtureDealsSource, StoreRecord};
pub use game_catalog_source::{
    CatalogGameRecord, CatalogSourceError, FixtureGameCatalogSource, GameCatalogSource,
};
pub use genre_enrichment_source::{
    EnrichmentSourceError, FixtureGenreEnrichmentSource, GenreEnrichmentSource,
};
pub use purchase_repository::{
    InMemoryPurchaseRepository, PurchasePersistenceError, PurchaseRepository,
};
pub use review_repository::{InMemoryReviewRepository, ReviewPersistenceError, ReviewRepository};
pub use token_verifier::{
    FixtureGoogleTokenVerifier, GoogleTokenVerifier, TokenVerificationError, FIXTURE_GOOGLE_TOKEN,
};
pub use user_repository::{InMemoryUserRepository, UserPersistenceError, UserRepository};
pub use wishlist_repository::{
    InMemoryWishlistRepository, WishlistPersistenceError, WishlistRepository,
};

#[cfg(test)]
pub use deals_source::MockDealsSource;
#[cfg(test)]
pub use game_catalog_source::MockGameCatalogSource;
#[cfg(test)]
pub use genre_enrichment_source::MockGenreEnrichmentSource;
#[cfg(test)]
pub use token_verifier::MockGoogleTokenVerifier;
#[cfg(test)]
pub use user_repository::MockUserRepository;
