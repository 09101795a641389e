//! Driving port for catalog fetch-and-reshape use-cases.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CatalogGame, Deal, DealSort, Error, Game, GamePrice};

/// Reshaped CheapShark deals page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DealsPage {
    pub games: Vec<Game>,
    pub prices: Vec<GamePrice>,
}

/// Query parameters for the top-deals listing.
#[derive(Debug, Clone)]
pub struct TopDealsQuery {
    pub search: Option<String>,
    /// Minimum discount percentage; clamped to `[0, 100]`.
    pub min_discount: f64,
    /// Maximum deals returned; clamped to `1..=200`.
    pub limit: u32,
    pub sort: DealSort,
}

impl Default for TopDealsQuery {
    fn default() -> Self {
        Self {
            search: None,
            min_discount: 60.0,
            limit: 30,
            sort: DealSort::default(),
        }
    }
}

/// IGDB catalog page; degrades to an empty page on upstream failure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogPage {
    pub count: usize,
    pub games: Vec<CatalogGame>,
}

/// Genre statistics over a fixed window of catalog games.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenreStatsReport {
    /// Number of games sampled.
    pub count: usize,
    /// Genre name to occurrence count.
    pub genre_stats: BTreeMap<String, u64>,
}

/// Summary returned by the legacy fetch-and-transform trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlRunSummary {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub games_processed: usize,
    pub prices_processed: usize,
}

/// Domain use-case port for the catalog layer.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Fetch and reshape CheapShark deals.
    ///
    /// With `enrich` set, genre names are looked up per title from the
    /// enrichment source on a best-effort basis.
    async fn deals(
        &self,
        search: Option<&str>,
        page_size: u32,
        enrich: bool,
    ) -> Result<DealsPage, Error>;

    /// Fetch deals filtered by minimum discount and sorted.
    async fn top_deals(&self, query: TopDealsQuery) -> Result<Vec<Deal>, Error>;

    /// Fetch the IGDB catalog with resolved genres and normalised covers.
    async fn catalog_games(&self, limit: u32) -> Result<CatalogPage, Error>;

    /// Genre statistics over a fixed window of catalog games.
    async fn genre_stats(&self) -> Result<GenreStatsReport, Error>;

    /// Legacy trigger: run the fetch-and-transform pass and summarise it.
    async fn run_etl(&self, search: Option<&str>) -> Result<EtlRunSummary, Error>;
}
