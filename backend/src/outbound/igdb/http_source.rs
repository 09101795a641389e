//! Reqwest-backed IGDB source adapter with OAuth token caching.
//!
//! IGDB authenticates via the Twitch client-credentials flow. The adapter
//! caches the access token in process memory and refreshes it when within
//! sixty seconds of expiry; concurrent refreshes are serialised behind an
//! async lock so only one OAuth call is in flight at a time.

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::catalog::IGDB_GAME_LIMIT;
use crate::domain::ports::{CatalogGameRecord, CatalogSourceError, GameCatalogSource};

use super::dto::{GameDto, GameGenresDto, GenreDto, OauthTokenDto};

/// Twitch OAuth token endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://id.twitch.tv/oauth2/token";
/// IGDB API root.
pub const DEFAULT_API_URL: &str = "https://api.igdb.com/v4";
/// Fixed request timeout for IGDB calls.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Refresh the token once it is this close to expiry.
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;
/// Token lifetime assumed when the OAuth response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Twitch application credentials for IGDB.
#[derive(Debug, Clone)]
pub struct IgdbCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS)
    }
}

/// IGDB source adapter performing authenticated HTTP POST requests.
pub struct IgdbHttpSource {
    client: Client,
    credentials: IgdbCredentials,
    oauth_url: Url,
    api_url: Url,
    token: Mutex<Option<CachedToken>>,
}

impl IgdbHttpSource {
    /// Build an adapter against the public API with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(credentials: IgdbCredentials) -> Result<Self, reqwest::Error> {
        let oauth = Url::parse(DEFAULT_OAUTH_URL).unwrap_or_else(|error| {
            panic!("default IGDB OAuth URL failed to parse: {error}")
        });
        let api = Url::parse(DEFAULT_API_URL)
            .unwrap_or_else(|error| panic!("default IGDB API URL failed to parse: {error}"));
        Self::with_endpoints(credentials, oauth, api, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with explicit endpoints and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoints(
        credentials: IgdbCredentials,
        oauth_url: Url,
        api_url: Url,
        timeout: StdDuration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
            oauth_url,
            api_url,
            token: Mutex::new(None),
        })
    }

    fn endpoint(&self, segment: &str) -> Result<Url, CatalogSourceError> {
        let raw = format!("{}/{segment}", self.api_url.as_str().trim_end_matches('/'));
        Url::parse(&raw)
            .map_err(|err| CatalogSourceError::transport(format!("invalid endpoint URL: {err}")))
    }

    /// Return a cached token, refreshing it through the OAuth endpoint when
    /// missing or near expiry.
    async fn access_token(&self) -> Result<String, CatalogSourceError> {
        if self.credentials.client_id.is_empty() || self.credentials.client_secret.is_empty() {
            return Err(CatalogSourceError::no_token("credentials not configured"));
        }

        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.token.clone());
            }
        }

        let response = self
            .client
            .post(self.oauth_url.clone())
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(CatalogSourceError::no_token(format!(
                "OAuth endpoint returned status {}",
                status.as_u16()
            )));
        }

        let dto: OauthTokenDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            CatalogSourceError::decode(format!("invalid OAuth JSON payload: {err}"))
        })?;
        let token = dto
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CatalogSourceError::no_token("OAuth response missing access_token"))?;
        let lifetime = dto.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + Duration::seconds(lifetime),
        });
        Ok(token)
    }

    /// POST an IGDB query (Apicalypse text body) and decode the response.
    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        segment: &str,
        body: String,
    ) -> Result<T, CatalogSourceError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.endpoint(segment)?)
            .header("Client-ID", self.credentials.client_id.as_str())
            .bearer_auth(token)
            .body(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        serde_json::from_slice(bytes.as_ref())
            .map_err(|err| CatalogSourceError::decode(format!("invalid IGDB JSON payload: {err}")))
    }
}

#[async_trait]
impl GameCatalogSource for IgdbHttpSource {
    async fn fetch_genre_catalog(&self) -> Result<HashMap<i64, String>, CatalogSourceError> {
        let genres: Vec<GenreDto> = self
            .query("genres", "fields id,name; limit 500;".to_owned())
            .await?;

        let mut catalog = HashMap::new();
        for genre in genres {
            match (genre.id, genre.name) {
                (Some(id), Some(name)) if !name.is_empty() => {
                    catalog.insert(id, name);
                }
                _ => warn!("skipping genre row without id or name"),
            }
        }
        Ok(catalog)
    }

    async fn fetch_games(&self, limit: u32) -> Result<Vec<CatalogGameRecord>, CatalogSourceError> {
        let limit = limit.clamp(1, IGDB_GAME_LIMIT);
        let body = format!(
            "fields name,rating,first_release_date,genres,cover.url; sort id asc; limit {limit};"
        );
        let games: Vec<GameDto> = self.query("games", body).await?;
        Ok(games.into_iter().map(GameDto::into_record).collect())
    }

    async fn fetch_genre_id_lists(&self) -> Result<Vec<Vec<i64>>, CatalogSourceError> {
        let body = format!("fields genres; sort id asc; limit {IGDB_GAME_LIMIT};");
        let games: Vec<GameGenresDto> = self.query("games", body).await?;
        Ok(games
            .into_iter()
            .map(|game| game.genres.unwrap_or_default())
            .collect())
    }
}

fn map_transport_error(error: reqwest::Error) -> CatalogSourceError {
    if error.is_timeout() {
        CatalogSourceError::timeout(error.to_string())
    } else {
        CatalogSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> CatalogSourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CatalogSourceError::no_token(format!("IGDB rejected the token: {}", status.as_u16()))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CatalogSourceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => CatalogSourceError::transport(format!("status {}", status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the non-network helpers.
    use super::*;
    use rstest::rstest;

    #[test]
    fn cached_tokens_respect_the_expiry_buffer() {
        let now = Utc::now();
        let fresh = CachedToken {
            token: "abc".to_owned(),
            expires_at: now + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS + 30),
        };
        assert!(fresh.is_fresh(now));

        let nearly_expired = CachedToken {
            token: "abc".to_owned(),
            expires_at: now + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS - 5),
        };
        assert!(!nearly_expired.is_fresh(now));
    }

    #[tokio::test]
    async fn missing_credentials_report_no_token() {
        let source = IgdbHttpSource::new(IgdbCredentials {
            client_id: String::new(),
            client_secret: String::new(),
        })
        .expect("client builds");

        let err = source
            .access_token()
            .await
            .expect_err("empty credentials must fail");
        assert!(matches!(err, CatalogSourceError::NoToken { .. }));
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "NoToken")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn statuses_map_to_expected_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status);
        let name = match error {
            CatalogSourceError::NoToken { .. } => "NoToken",
            CatalogSourceError::Timeout { .. } => "Timeout",
            CatalogSourceError::Transport { .. } => "Transport",
            CatalogSourceError::Decode { .. } => "Decode",
        };
        assert_eq!(name, expected);
    }
}
