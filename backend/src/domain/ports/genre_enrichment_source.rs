//! Port for RAWG genre enrichment.
//!
//! Enrichment is best-effort: deal listings call it with a short timeout and
//! treat every failure as "no genres known".

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by genre enrichment adapters.
    pub enum EnrichmentSourceError {
        /// The upstream did not answer within the configured timeout.
        Timeout { message: String } =>
            "enrichment source timed out: {message}",
        /// Transport-level failure (connection, TLS, unexpected status).
        Transport { message: String } =>
            "enrichment source transport failure: {message}",
        /// The upstream payload could not be decoded.
        Decode { message: String } =>
            "enrichment source returned an undecodable payload: {message}",
    }
}

/// Port for looking up genre names for a game title.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreEnrichmentSource: Send + Sync {
    /// Return genre names for the best title match, empty when unknown.
    async fn genres_for_title(&self, title: &str) -> Result<Vec<String>, EnrichmentSourceError>;
}

/// Fixture enrichment source with a single known title.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGenreEnrichmentSource;

#[async_trait]
impl GenreEnrichmentSource for FixtureGenreEnrichmentSource {
    async fn genres_for_title(&self, title: &str) -> Result<Vec<String>, EnrichmentSourceError> {
        if title.eq_ignore_ascii_case("portal") {
            Ok(vec!["Puzzle".to_owned(), "Shooter".to_owned()])
        } else {
            Ok(Vec::new())
        }
    }
}
