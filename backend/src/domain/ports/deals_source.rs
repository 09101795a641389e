//! Port for the CheapShark deals API.
//!
//! The adapter owns transport details (HTTP, JSON decoding); the port speaks
//! in plain records that the domain reshapes into client-facing types.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by deals source adapters.
    pub enum DealsSourceError {
        /// The upstream did not answer within the configured timeout.
        Timeout { message: String } =>
            "deals source timed out: {message}",
        /// Transport-level failure (connection, TLS, unexpected status).
        Transport { message: String } =>
            "deals source transport failure: {message}",
        /// The upstream payload could not be decoded.
        Decode { message: String } =>
            "deals source returned an undecodable payload: {message}",
    }
}

impl From<DealsSourceError> for crate::domain::Error {
    fn from(value: DealsSourceError) -> Self {
        Self::upstream(format!("upstream CheapShark API error: {value}"))
    }
}

/// One raw deal as reported by the upstream, prices already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    /// Upstream game identifier (not yet namespaced).
    pub game_id: String,
    /// Upstream deal identifier, used to build redirect URLs.
    pub deal_id: String,
    /// Game title.
    pub title: String,
    /// Thumbnail URL.
    pub thumb: Option<String>,
    /// Upstream store identifier.
    pub store_id: String,
    /// Discounted price.
    pub sale_price: Option<f64>,
    /// Pre-discount price.
    pub normal_price: Option<f64>,
    /// Upstream-reported discount percentage.
    pub savings: Option<f64>,
}

/// One storefront as reported by the upstream stores endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub id: String,
    pub name: String,
}

/// Port for fetching deals and store metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealsSource: Send + Sync {
    /// Fetch up to `page_size` deals, optionally filtered by title.
    async fn fetch_deals<'a>(
        &self,
        search: Option<&'a str>,
        page_size: u32,
    ) -> Result<Vec<DealRecord>, DealsSourceError>;

    /// Fetch the storefront directory.
    async fn fetch_stores(&self) -> Result<Vec<StoreRecord>, DealsSourceError>;
}

/// Fixture source returning a deterministic pair of deals.
///
/// Used by handler tests and when the server runs without upstream access.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDealsSource;

#[async_trait]
impl DealsSource for FixtureDealsSource {
    async fn fetch_deals<'a>(
        &self,
        search: Option<&'a str>,
        page_size: u32,
    ) -> Result<Vec<DealRecord>, DealsSourceError> {
        let deals = vec![
            DealRecord {
                game_id: "612".to_owned(),
                deal_id: "deal-portal".to_owned(),
                title: "Portal".to_owned(),
                thumb: Some("https://cdn.example/portal.jpg".to_owned()),
                store_id: "1".to_owned(),
                sale_price: Some(1.99),
                normal_price: Some(9.99),
                savings: Some(80.08),
            },
            DealRecord {
                game_id: "7231".to_owned(),
                deal_id: "deal-hades".to_owned(),
                title: "Hades".to_owned(),
                thumb: None,
                store_id: "25".to_owned(),
                sale_price: Some(12.49),
                normal_price: Some(24.99),
                savings: Some(50.02),
            },
        ];

        let filtered: Vec<DealRecord> = deals
            .into_iter()
            .filter(|deal| match search {
                Some(term) => deal.title.to_lowercase().contains(&term.to_lowercase()),
                None => true,
            })
            .take(page_size as usize)
            .collect();
        Ok(filtered)
    }

    async fn fetch_stores(&self) -> Result<Vec<StoreRecord>, DealsSourceError> {
        Ok(vec![
            StoreRecord {
                id: "1".to_owned(),
                name: "Steam".to_owned(),
            },
            StoreRecord {
                id: "25".to_owned(),
                name: "Epic Games".to_owned(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_source_filters_by_title() {
        let source = FixtureDealsSource;
        let deals = source
            .fetch_deals(Some("portal"), 20)
            .await
            .expect("fixture fetch succeeds");
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].title, "Portal");
    }

    #[tokio::test]
    async fn fixture_source_honours_page_size() {
        let source = FixtureDealsSource;
        let deals = source
            .fetch_deals(None, 1)
            .await
            .expect("fixture fetch succeeds");
        assert_eq!(deals.len(), 1);
    }

    #[test]
    fn error_constructors_render_messages() {
        let err = DealsSourceError::timeout("no response after 10s");
        assert!(err.to_string().contains("timed out"));
    }
}
