//! Port for the IGDB game catalog.
//!
//! IGDB failures are soft: the adapter reports errors, but the service layer
//! degrades to empty results instead of failing requests, matching the
//! behaviour of the original API.

use std::collections::HashMap;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog source adapters.
    pub enum CatalogSourceError {
        /// No OAuth token could be obtained.
        NoToken { message: String } =>
            "catalog source has no access token: {message}",
        /// The upstream did not answer within the configured timeout.
        Timeout { message: String } =>
            "catalog source timed out: {message}",
        /// Transport-level failure (connection, TLS, unexpected status).
        Transport { message: String } =>
            "catalog source transport failure: {message}",
        /// The upstream payload could not be decoded.
        Decode { message: String } =>
            "catalog source returned an undecodable payload: {message}",
    }
}

/// One game row fetched from the catalog, genres still as raw ids.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogGameRecord {
    pub name: String,
    pub rating: Option<f64>,
    /// Unix timestamp (seconds) of the first release.
    pub first_release_date: Option<i64>,
    pub genre_ids: Vec<i64>,
    /// Raw cover URL as served by the upstream (possibly protocol-relative).
    pub cover_url: Option<String>,
}

/// Port for fetching catalog games and genre metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameCatalogSource: Send + Sync {
    /// Fetch the genre catalog (id to name) in a single call.
    async fn fetch_genre_catalog(&self) -> Result<HashMap<i64, String>, CatalogSourceError>;

    /// Fetch up to `limit` games with full details.
    async fn fetch_games(&self, limit: u32) -> Result<Vec<CatalogGameRecord>, CatalogSourceError>;

    /// Fetch only the genre-id lists for a fixed window of games.
    ///
    /// Cheaper than [`GameCatalogSource::fetch_games`]; used for the genre
    /// statistics endpoint.
    async fn fetch_genre_id_lists(&self) -> Result<Vec<Vec<i64>>, CatalogSourceError>;
}

/// Fixture catalog with two games and a small genre table.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGameCatalogSource;

#[async_trait]
impl GameCatalogSource for FixtureGameCatalogSource {
    async fn fetch_genre_catalog(&self) -> Result<HashMap<i64, String>, CatalogSourceError> {
        Ok([(5, "Shooter".to_owned()), (12, "RPG".to_owned())].into())
    }

    async fn fetch_games(&self, limit: u32) -> Result<Vec<CatalogGameRecord>, CatalogSourceError> {
        let games = vec![
            CatalogGameRecord {
                name: "Portal".to_owned(),
                rating: Some(89.5),
                first_release_date: Some(1_191_974_400),
                genre_ids: vec![5],
                cover_url: Some("//images.igdb.com/t_thumb/portal.jpg".to_owned()),
            },
            CatalogGameRecord {
                name: "Hades".to_owned(),
                rating: None,
                first_release_date: None,
                genre_ids: vec![],
                cover_url: None,
            },
        ];
        Ok(games.into_iter().take(limit as usize).collect())
    }

    async fn fetch_genre_id_lists(&self) -> Result<Vec<Vec<i64>>, CatalogSourceError> {
        Ok(vec![vec![5], vec![]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_catalog_respects_limit() {
        let source = FixtureGameCatalogSource;
        let games = source.fetch_games(1).await.expect("fixture fetch succeeds");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Portal");
    }

    #[test]
    fn no_token_error_renders_message() {
        let err = CatalogSourceError::no_token("credentials not configured");
        assert!(err.to_string().contains("no access token"));
    }
}
