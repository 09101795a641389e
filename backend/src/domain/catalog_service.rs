//! Catalog domain service.
//!
//! Implements the [`CatalogQuery`] driving port over the upstream source
//! ports. This is the whole "ETL": extract via the source ports, transform
//! with the pure helpers in [`crate::domain::catalog`], and return the result
//! without persisting anything.
//!
//! Failure policy follows the original service: CheapShark failures surface
//! as upstream errors, IGDB and RAWG failures degrade to empty results.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::catalog::{
    build_genre_stats, deal_to_game_and_price, discount_percent, normalize_cover_url,
    release_date_from_timestamp, resolve_genre_names, sort_deals, store_display_name,
    fallback_store_directory, CatalogGame, Deal, DEAL_FETCH_CAP, IGDB_GAME_LIMIT,
};
use crate::domain::ports::{
    CatalogPage, CatalogQuery, DealsPage, DealsSource, EtlRunSummary, GameCatalogSource,
    GenreEnrichmentSource, GenreStatsReport, TopDealsQuery,
};
use crate::domain::Error;

/// Process-lifetime cache of the CheapShark store directory.
///
/// The first successful fetch is cached for the process lifetime; failed
/// fetches fall back to the built-in table without caching, so a later
/// request retries the upstream.
#[derive(Default)]
struct StoreDirectory {
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl StoreDirectory {
    async fn resolve(&self, source: &dyn DealsSource) -> HashMap<String, String> {
        if let Some(directory) = self.cache.read().await.as_ref() {
            return directory.clone();
        }

        match source.fetch_stores().await {
            Ok(stores) if !stores.is_empty() => {
                let directory: HashMap<String, String> = stores
                    .into_iter()
                    .filter(|store| !store.id.is_empty() && !store.name.is_empty())
                    .map(|store| (store.id, store.name))
                    .collect();
                *self.cache.write().await = Some(directory.clone());
                directory
            }
            Ok(_) => {
                warn!("store directory fetch returned no rows, using fallback table");
                fallback_store_directory()
            }
            Err(error) => {
                warn!(%error, "store directory fetch failed, using fallback table");
                fallback_store_directory()
            }
        }
    }
}

/// Catalog service implementing the [`CatalogQuery`] driving port.
pub struct CatalogService {
    deals: Arc<dyn DealsSource>,
    catalog: Arc<dyn GameCatalogSource>,
    enrichment: Option<Arc<dyn GenreEnrichmentSource>>,
    stores: StoreDirectory,
}

impl CatalogService {
    /// Create a new service over the given source ports.
    pub fn new(
        deals: Arc<dyn DealsSource>,
        catalog: Arc<dyn GameCatalogSource>,
        enrichment: Option<Arc<dyn GenreEnrichmentSource>>,
    ) -> Self {
        Self {
            deals,
            catalog,
            enrichment,
            stores: StoreDirectory::default(),
        }
    }

    /// Best-effort genre lookup; any failure reads as "no genres known".
    async fn enriched_genres(&self, title: &str) -> Vec<String> {
        let Some(enrichment) = &self.enrichment else {
            return Vec::new();
        };
        match enrichment.genres_for_title(title).await {
            Ok(genres) => genres,
            Err(error) => {
                warn!(%error, title, "genre enrichment failed");
                Vec::new()
            }
        }
    }

    /// Genre catalog with soft failure: an empty map leaves genres Unknown.
    async fn genre_catalog_or_empty(&self) -> HashMap<i64, String> {
        match self.catalog.fetch_genre_catalog().await {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(%error, "genre catalog fetch failed");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl CatalogQuery for CatalogService {
    async fn deals(
        &self,
        search: Option<&str>,
        page_size: u32,
        enrich: bool,
    ) -> Result<DealsPage, Error> {
        let page_size = page_size.clamp(1, DEAL_FETCH_CAP);
        let raw_deals = self.deals.fetch_deals(search, page_size).await?;
        let directory = self.stores.resolve(self.deals.as_ref()).await;

        // Enrichment only applies when a source is configured; otherwise the
        // genre fields are omitted entirely, as in the plain deals flow.
        let enrich = enrich && self.enrichment.is_some();

        let mut page = DealsPage::default();
        for deal in &raw_deals {
            let genres = if enrich {
                Some(self.enriched_genres(&deal.title).await)
            } else {
                None
            };
            let store = store_display_name(&deal.store_id, &directory);
            let (game, price) = deal_to_game_and_price(deal, &store, genres);
            page.games.push(game);
            page.prices.push(price);
        }
        Ok(page)
    }

    async fn top_deals(&self, query: TopDealsQuery) -> Result<Vec<Deal>, Error> {
        let min_discount = query.min_discount.clamp(0.0, 100.0);
        let limit = query.limit.clamp(1, DEAL_FETCH_CAP);
        // Fetch a wider window so post-filter results can still fill the page.
        let fetch_window = (limit * 2).min(DEAL_FETCH_CAP);

        let raw_deals = self
            .deals
            .fetch_deals(query.search.as_deref(), fetch_window)
            .await?;
        let directory = self.stores.resolve(self.deals.as_ref()).await;

        let mut deals = Vec::new();
        for raw in &raw_deals {
            let discount = discount_percent(raw);
            if discount < min_discount {
                continue;
            }
            let store = store_display_name(&raw.store_id, &directory);
            let (game, price) = deal_to_game_and_price(raw, &store, None);
            deals.push(Deal {
                game,
                price,
                discount_percent: discount,
                normal_price: raw.normal_price,
                sale_price: raw.sale_price,
            });
        }

        sort_deals(&mut deals, query.sort);
        deals.truncate(limit as usize);
        Ok(deals)
    }

    async fn catalog_games(&self, limit: u32) -> Result<CatalogPage, Error> {
        let limit = limit.clamp(1, IGDB_GAME_LIMIT);
        let genre_catalog = self.genre_catalog_or_empty().await;

        let records = match self.catalog.fetch_games(limit).await {
            Ok(records) => records,
            Err(error) => {
                warn!(%error, "catalog games fetch failed, returning empty page");
                return Ok(CatalogPage::default());
            }
        };

        let games: Vec<CatalogGame> = records
            .into_iter()
            .map(|record| CatalogGame {
                genres: resolve_genre_names(&record.genre_ids, &genre_catalog),
                release_date: release_date_from_timestamp(record.first_release_date),
                image_url: normalize_cover_url(record.cover_url.as_deref()),
                rating: record.rating.filter(|rating| rating.is_finite()),
                name: record.name,
            })
            .collect();

        Ok(CatalogPage {
            count: games.len(),
            games,
        })
    }

    async fn genre_stats(&self) -> Result<GenreStatsReport, Error> {
        let genre_catalog = self.genre_catalog_or_empty().await;

        let genre_id_lists = match self.catalog.fetch_genre_id_lists().await {
            Ok(lists) => lists,
            Err(error) => {
                warn!(%error, "genre id fetch failed, returning empty stats");
                return Ok(GenreStatsReport::default());
            }
        };

        let genre_stats = build_genre_stats(&genre_id_lists, &genre_catalog);
        Ok(GenreStatsReport {
            count: genre_id_lists.len(),
            genre_stats,
        })
    }

    async fn run_etl(&self, search: Option<&str>) -> Result<EtlRunSummary, Error> {
        let page = self.deals(search, 30, false).await?;
        Ok(EtlRunSummary {
            status: "completed".to_owned(),
            timestamp: Utc::now(),
            games_processed: page.games.len(),
            prices_processed: page.prices.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        CatalogSourceError, DealRecord, DealsSourceError, FixtureDealsSource,
        FixtureGameCatalogSource, FixtureGenreEnrichmentSource, MockDealsSource,
        MockGameCatalogSource, StoreRecord,
    };
    use crate::domain::{DealSort, ErrorCode};

    fn fixture_service() -> CatalogService {
        CatalogService::new(
            Arc::new(FixtureDealsSource),
            Arc::new(FixtureGameCatalogSource),
            Some(Arc::new(FixtureGenreEnrichmentSource)),
        )
    }

    #[tokio::test]
    async fn deals_reshape_with_store_names() {
        let service = fixture_service();
        let page = service.deals(None, 20, false).await.expect("deals fetch");

        assert_eq!(page.games.len(), 2);
        assert_eq!(page.prices.len(), 2);
        assert_eq!(page.games[0].id, "cs_612");
        assert_eq!(page.prices[0].store, "Steam");
        assert!(page.games[0].genres.is_none());
    }

    #[tokio::test]
    async fn deals_enrichment_falls_back_to_unknown() {
        let service = fixture_service();
        let page = service.deals(None, 20, true).await.expect("deals fetch");

        // Portal resolves genres from the fixture; Hades does not.
        assert_eq!(
            page.games[0].genres,
            Some(vec!["Puzzle".to_owned(), "Shooter".to_owned()])
        );
        assert_eq!(page.games[1].genres, Some(vec!["Unknown".to_owned()]));
    }

    #[tokio::test]
    async fn deals_surface_upstream_failures() {
        let mut deals = MockDealsSource::new();
        deals
            .expect_fetch_deals()
            .returning(|_, _| Err(DealsSourceError::timeout("no answer")));
        let service = CatalogService::new(
            Arc::new(deals),
            Arc::new(FixtureGameCatalogSource),
            None,
        );

        let err = service
            .deals(None, 20, false)
            .await
            .expect_err("timeout must surface");
        assert_eq!(err.code(), ErrorCode::UpstreamError);
    }

    #[tokio::test]
    async fn top_deals_filter_sort_and_limit() {
        let service = fixture_service();
        let deals = service
            .top_deals(TopDealsQuery {
                min_discount: 60.0,
                ..TopDealsQuery::default()
            })
            .await
            .expect("top deals fetch");

        // Only Portal (80%) clears the 60% bar.
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].game.title, "Portal");

        let all = service
            .top_deals(TopDealsQuery {
                min_discount: 0.0,
                sort: DealSort::Price,
                ..TopDealsQuery::default()
            })
            .await
            .expect("top deals fetch");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sale_price, Some(1.99));
    }

    #[tokio::test]
    async fn store_directory_falls_back_when_fetch_fails() {
        let mut deals = MockDealsSource::new();
        deals.expect_fetch_deals().returning(|_, _| {
            Ok(vec![DealRecord {
                game_id: "1".to_owned(),
                deal_id: "d".to_owned(),
                title: "Portal".to_owned(),
                thumb: None,
                store_id: "7".to_owned(),
                sale_price: Some(1.0),
                normal_price: Some(2.0),
                savings: Some(50.0),
            }])
        });
        deals
            .expect_fetch_stores()
            .returning(|| Err(DealsSourceError::transport("refused")));
        let service =
            CatalogService::new(Arc::new(deals), Arc::new(FixtureGameCatalogSource), None);

        let page = service.deals(None, 10, false).await.expect("deals fetch");
        assert_eq!(page.prices[0].store, "GOG");
    }

    #[tokio::test]
    async fn store_directory_caches_first_successful_fetch() {
        let mut deals = MockDealsSource::new();
        deals.expect_fetch_deals().returning(|_, _| Ok(Vec::new()));
        // A second fetch_stores call would violate the expectation count.
        deals.expect_fetch_stores().times(1).returning(|| {
            Ok(vec![StoreRecord {
                id: "1".to_owned(),
                name: "Steam".to_owned(),
            }])
        });
        let service =
            CatalogService::new(Arc::new(deals), Arc::new(FixtureGameCatalogSource), None);

        service.deals(None, 10, false).await.expect("first fetch");
        service.deals(None, 10, false).await.expect("second fetch");
    }

    #[tokio::test]
    async fn catalog_games_resolve_genres_dates_and_covers() {
        let service = fixture_service();
        let page = service.catalog_games(500).await.expect("catalog fetch");

        assert_eq!(page.count, 2);
        assert_eq!(page.games[0].genres, vec!["Shooter"]);
        assert_eq!(page.games[0].release_date.as_deref(), Some("2007-10-10"));
        assert_eq!(
            page.games[0].image_url.as_deref(),
            Some("https://images.igdb.com/t_thumb/portal.jpg")
        );
        assert_eq!(page.games[1].genres, vec!["Unknown"]);
    }

    #[tokio::test]
    async fn catalog_games_degrade_to_empty_page() {
        let mut catalog = MockGameCatalogSource::new();
        catalog
            .expect_fetch_genre_catalog()
            .returning(|| Err(CatalogSourceError::no_token("not configured")));
        catalog
            .expect_fetch_games()
            .returning(|_| Err(CatalogSourceError::no_token("not configured")));
        let service = CatalogService::new(Arc::new(FixtureDealsSource), Arc::new(catalog), None);

        let page = service.catalog_games(500).await.expect("degrades, not errors");
        assert_eq!(page.count, 0);
        assert!(page.games.is_empty());
    }

    #[tokio::test]
    async fn genre_stats_count_unknown_games() {
        let service = fixture_service();
        let report = service.genre_stats().await.expect("stats fetch");

        assert_eq!(report.count, 2);
        assert_eq!(report.genre_stats.get("Shooter"), Some(&1));
        assert_eq!(report.genre_stats.get("Unknown"), Some(&1));
    }

    #[tokio::test]
    async fn etl_run_reports_processed_counts() {
        let service = fixture_service();
        let summary = service.run_etl(None).await.expect("etl run");

        assert_eq!(summary.status, "completed");
        assert_eq!(summary.games_processed, 2);
        assert_eq!(summary.prices_processed, 2);
    }
}
