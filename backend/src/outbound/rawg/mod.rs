//! RAWG outbound adapter for best-effort genre enrichment.
//!
//! Deliberately small: a single search call per title with a short timeout.
//! Callers treat every failure as "no genres known".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{EnrichmentSourceError, GenreEnrichmentSource};

/// RAWG API root.
pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
/// Short timeout for enrichment calls so deal listings stay responsive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
struct SearchResponseDto {
    #[serde(default)]
    results: Vec<GameResultDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct GameResultDto {
    #[serde(default)]
    genres: Vec<GenreDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenreDto {
    #[serde(default)]
    name: Option<String>,
}

/// RAWG source adapter performing HTTP GET searches.
pub struct RawgHttpSource {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RawgHttpSource {
    /// Build an adapter against the public API with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let base = Url::parse(DEFAULT_BASE_URL)
            .unwrap_or_else(|error| panic!("default RAWG base URL failed to parse: {error}"));
        Self::with_base_url(api_key, base, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with an explicit endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: Url,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl GenreEnrichmentSource for RawgHttpSource {
    async fn genres_for_title(&self, title: &str) -> Result<Vec<String>, EnrichmentSourceError> {
        let raw = format!("{}/games", self.base_url.as_str().trim_end_matches('/'));
        let url = Url::parse(&raw).map_err(|err| {
            EnrichmentSourceError::transport(format!("invalid endpoint URL: {err}"))
        })?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("search", title),
                ("page_size", "1"),
            ])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    EnrichmentSourceError::timeout(err.to_string())
                } else {
                    EnrichmentSourceError::transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentSourceError::transport(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let dto: SearchResponseDto = response.json().await.map_err(|err| {
            EnrichmentSourceError::decode(format!("invalid RAWG JSON payload: {err}"))
        })?;

        Ok(dto
            .results
            .into_iter()
            .next()
            .map(|game| {
                game.genres
                    .into_iter()
                    .filter_map(|genre| genre.name)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the payload decoding.
    use super::*;

    #[test]
    fn search_payload_decodes_genre_names() {
        let dto: SearchResponseDto = serde_json::from_str(
            r#"{
                "results": [
                    { "name": "Portal", "genres": [{ "name": "Puzzle" }, { "name": "" }] }
                ]
            }"#,
        )
        .expect("payload decodes");

        let genres: Vec<String> = dto
            .results
            .into_iter()
            .next()
            .map(|game| {
                game.genres
                    .into_iter()
                    .filter_map(|genre| genre.name)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(genres, vec!["Puzzle"]);
    }

    #[test]
    fn empty_results_decode_to_no_genres() {
        let dto: SearchResponseDto =
            serde_json::from_str(r#"{ "results": [] }"#).expect("payload decodes");
        assert!(dto.results.is_empty());
    }
}
