//! Reqwest-backed CheapShark source adapter.
//!
//! Owns transport details only: request construction, timeout and HTTP
//! error mapping, and JSON decoding into port records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{DealRecord, DealsSource, DealsSourceError, StoreRecord};

use super::dto::{DealDto, StoreDto};

/// Public CheapShark API root.
pub const DEFAULT_BASE_URL: &str = "https://www.cheapshark.com/api/1.0";
/// Fixed request timeout for CheapShark calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// CheapShark source adapter performing HTTP GET requests.
pub struct CheapSharkHttpSource {
    client: Client,
    base_url: Url,
}

impl CheapSharkHttpSource {
    /// Build an adapter against the public API with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|error| {
            // The constant is a valid URL; a parse failure is a programming error.
            panic!("default CheapShark base URL failed to parse: {error}")
        });
        Self::with_base_url(base, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with an explicit endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segment: &str) -> Result<Url, DealsSourceError> {
        let raw = format!("{}/{segment}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&raw)
            .map_err(|err| DealsSourceError::transport(format!("invalid endpoint URL: {err}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, DealsSourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        serde_json::from_slice(body.as_ref()).map_err(|err| {
            DealsSourceError::decode(format!("invalid CheapShark JSON payload: {err}"))
        })
    }
}

#[async_trait]
impl DealsSource for CheapSharkHttpSource {
    async fn fetch_deals<'a>(
        &self,
        search: Option<&'a str>,
        page_size: u32,
    ) -> Result<Vec<DealRecord>, DealsSourceError> {
        let mut query = vec![("pageSize", page_size.to_string())];
        if let Some(title) = search {
            query.push(("title", title.to_owned()));
        }

        let deals: Vec<DealDto> = self.get_json(self.endpoint("deals")?, &query).await?;
        Ok(deals.into_iter().map(DealDto::into_record).collect())
    }

    async fn fetch_stores(&self) -> Result<Vec<StoreRecord>, DealsSourceError> {
        let stores: Vec<StoreDto> = self.get_json(self.endpoint("stores")?, &[]).await?;
        Ok(stores.into_iter().filter_map(StoreDto::into_record).collect())
    }
}

fn map_transport_error(error: reqwest::Error) -> DealsSourceError {
    if error.is_timeout() {
        DealsSourceError::timeout(error.to_string())
    } else {
        DealsSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DealsSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DealsSourceError::timeout(message)
        }
        _ => DealsSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
