//! Transient game-catalog types and the reshaping logic applied to upstream
//! payloads.
//!
//! Nothing in this module is persisted: deals, games, and prices are fetched
//! from third-party APIs on request, reshaped here, and returned to clients.

use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::DealRecord;

/// Maximum games fetched from the IGDB catalog in one call.
pub const IGDB_GAME_LIMIT: u32 = 500;
/// Maximum deals requested from CheapShark in one call.
pub const DEAL_FETCH_CAP: u32 = 200;
/// Genre bucket used when no genre can be resolved.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// A game as presented to clients.
///
/// CheapShark-derived games use the `cs_<gameID>` identifier scheme so ids
/// from different upstreams cannot collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Namespaced upstream identifier.
    pub id: String,
    /// Game title.
    pub title: String,
    /// Genre names, when enrichment supplied them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Cover or thumbnail URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A store price offer for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GamePrice {
    /// Identifier of the game this price belongs to.
    pub game_id: String,
    /// Store display name.
    pub store: String,
    /// Current sale price.
    pub price: f64,
    /// ISO currency code.
    pub currency: String,
    /// Redirect URL for the deal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A discounted offer combining game, price, and discount details.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// The discounted game.
    pub game: Game,
    /// The offer details.
    pub price: GamePrice,
    /// Discount percentage in `[0, 100]`.
    pub discount_percent: f64,
    /// Pre-discount price, when the upstream supplied it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_price: Option<f64>,
    /// Discounted price, when the upstream supplied it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

/// Sort orders for the top-deals listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DealSort {
    /// Highest discount percentage first.
    #[default]
    Discount,
    /// Largest absolute saving first.
    Savings,
    /// Cheapest sale price first.
    Price,
}

impl DealSort {
    /// Parse a query-string value, falling back to the default for unknown
    /// input (mirrors the lenient behaviour of the original API).
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "savings" => Self::Savings,
            "price" => Self::Price,
            _ => Self::Discount,
        }
    }
}

/// A catalog entry fetched from IGDB with resolved genre names.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGame {
    /// Game name.
    pub name: String,
    /// IGDB aggregate rating, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Release date as `YYYY-MM-DD`, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Resolved genre names; never empty (`Unknown` fills the gap).
    pub genres: Vec<String>,
    /// Normalised cover URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Compute the discount percentage for a raw deal.
///
/// Prefers the upstream `savings` figure, falling back to
/// `(1 - sale/normal) * 100`. The result is clamped to `[0, 100]`; deals
/// without usable price data report zero.
pub fn discount_percent(deal: &DealRecord) -> f64 {
    if let Some(savings) = deal.savings {
        if savings.is_finite() {
            return savings.clamp(0.0, 100.0);
        }
    }

    match (deal.normal_price, deal.sale_price) {
        (Some(normal), Some(sale)) if normal > 0.0 && normal.is_finite() && sale.is_finite() => {
            ((1.0 - sale / normal) * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Reshape a raw CheapShark deal into a [`Game`] / [`GamePrice`] pair.
///
/// `genres` follows the original contract: `None` omits the field entirely,
/// an empty list collapses to `["Unknown"]`.
pub fn deal_to_game_and_price(
    deal: &DealRecord,
    store_name: &str,
    genres: Option<Vec<String>>,
) -> (Game, GamePrice) {
    let genres = genres.map(|names| {
        if names.is_empty() {
            vec![UNKNOWN_GENRE.to_owned()]
        } else {
            names
        }
    });

    let game = Game {
        id: format!("cs_{}", deal.game_id),
        title: deal.title.clone(),
        genres,
        image_url: deal.thumb.clone(),
    };

    let price = GamePrice {
        game_id: game.id.clone(),
        store: store_name.to_owned(),
        price: deal.sale_price.unwrap_or(0.0),
        currency: "USD".to_owned(),
        url: Some(format!(
            "https://www.cheapshark.com/redirect?dealID={}",
            deal.deal_id
        )),
    };

    (game, price)
}

/// Sort deals in place according to the requested order.
pub fn sort_deals(deals: &mut [Deal], sort: DealSort) {
    match sort {
        DealSort::Discount => {
            deals.sort_by(|a, b| b.discount_percent.total_cmp(&a.discount_percent));
        }
        DealSort::Savings => deals.sort_by(|a, b| {
            let saving = |deal: &Deal| {
                deal.normal_price.unwrap_or(0.0) - deal.sale_price.unwrap_or(0.0)
            };
            saving(b).total_cmp(&saving(a))
        }),
        DealSort::Price => deals.sort_by(|a, b| {
            a.sale_price
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.sale_price.unwrap_or(f64::INFINITY))
        }),
    }
}

/// Built-in store-id to store-name table used when the CheapShark stores
/// endpoint is unreachable.
pub fn fallback_store_directory() -> HashMap<String, String> {
    [
        ("1", "Steam"),
        ("2", "GamersGate"),
        ("3", "GreenManGaming"),
        ("7", "GOG"),
        ("8", "Origin"),
        ("11", "Humble Store"),
        ("13", "Uplay"),
        ("25", "Epic Games"),
    ]
    .into_iter()
    .map(|(id, name)| (id.to_owned(), name.to_owned()))
    .collect()
}

/// Resolve a store id to a display name, rendering unknown ids as
/// `Store <id>`.
pub fn store_display_name(store_id: &str, directory: &HashMap<String, String>) -> String {
    directory
        .get(store_id)
        .cloned()
        .unwrap_or_else(|| format!("Store {store_id}"))
}

/// Count genre occurrences across games.
///
/// Each inner list holds the genre ids of one game. Games with no genres, or
/// whose ids all fail to resolve against the catalog, count towards
/// [`UNKNOWN_GENRE`].
pub fn build_genre_stats(
    genre_id_lists: &[Vec<i64>],
    catalog: &HashMap<i64, String>,
) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for genre_ids in genre_id_lists {
        let mut resolved_any = false;
        for id in genre_ids {
            if let Some(name) = catalog.get(id) {
                if !name.is_empty() {
                    *counts.entry(name.clone()).or_default() += 1;
                    resolved_any = true;
                }
            }
        }
        if !resolved_any {
            *counts.entry(UNKNOWN_GENRE.to_owned()).or_default() += 1;
        }
    }

    counts
}

/// Resolve genre ids to names, substituting `Unknown` when none resolve.
pub fn resolve_genre_names(genre_ids: &[i64], catalog: &HashMap<i64, String>) -> Vec<String> {
    let names: Vec<String> = genre_ids
        .iter()
        .filter_map(|id| catalog.get(id))
        .filter(|name| !name.is_empty())
        .cloned()
        .collect();

    if names.is_empty() {
        vec![UNKNOWN_GENRE.to_owned()]
    } else {
        names
    }
}

/// Normalise an IGDB cover URL to a full HTTPS URL.
///
/// IGDB serves protocol-relative URLs (`//images.igdb.com/...`); bare hosts
/// are assumed to be HTTPS.
pub fn normalize_cover_url(raw: Option<&str>) -> Option<String> {
    let url = raw?.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(rest) = url.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_owned());
    }
    Some(format!("https://{url}"))
}

/// Convert an IGDB Unix timestamp (seconds) to an ISO `YYYY-MM-DD` date.
pub fn release_date_from_timestamp(ts: Option<i64>) -> Option<String> {
    let ts = ts?;
    DateTime::from_timestamp(ts, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the reshaping helpers.
    use super::*;
    use rstest::rstest;

    fn record(savings: Option<f64>, normal: Option<f64>, sale: Option<f64>) -> DealRecord {
        DealRecord {
            game_id: "612".to_owned(),
            deal_id: "abc123".to_owned(),
            title: "Portal".to_owned(),
            thumb: Some("https://cdn.example/portal.jpg".to_owned()),
            store_id: "1".to_owned(),
            sale_price: sale,
            normal_price: normal,
            savings,
        }
    }

    #[rstest]
    #[case::savings_field(Some(60.5), None, None, 60.5)]
    #[case::savings_clamped_high(Some(140.0), None, None, 100.0)]
    #[case::savings_clamped_low(Some(-3.0), None, None, 0.0)]
    #[case::computed(None, Some(20.0), Some(5.0), 75.0)]
    #[case::zero_normal(None, Some(0.0), Some(5.0), 0.0)]
    #[case::missing_everything(None, None, None, 0.0)]
    fn discount_percent_prefers_savings_then_computes(
        #[case] savings: Option<f64>,
        #[case] normal: Option<f64>,
        #[case] sale: Option<f64>,
        #[case] expected: f64,
    ) {
        let deal = record(savings, normal, sale);
        assert!((discount_percent(&deal) - expected).abs() < 1e-9);
    }

    #[test]
    fn discount_percent_ignores_non_finite_savings() {
        let deal = record(Some(f64::NAN), Some(10.0), Some(5.0));
        assert!((discount_percent(&deal) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn deal_transform_namespaces_ids_and_builds_redirect() {
        let deal = record(Some(50.0), Some(10.0), Some(5.0));
        let (game, price) = deal_to_game_and_price(&deal, "Steam", None);

        assert_eq!(game.id, "cs_612");
        assert_eq!(price.game_id, "cs_612");
        assert_eq!(price.store, "Steam");
        assert_eq!(price.currency, "USD");
        assert_eq!(
            price.url.as_deref(),
            Some("https://www.cheapshark.com/redirect?dealID=abc123")
        );
        assert!(game.genres.is_none());
    }

    #[test]
    fn deal_transform_substitutes_unknown_for_empty_genres() {
        let deal = record(None, None, None);
        let (game, _) = deal_to_game_and_price(&deal, "GOG", Some(Vec::new()));
        assert_eq!(game.genres, Some(vec![UNKNOWN_GENRE.to_owned()]));
    }

    fn deal(discount: f64, normal: Option<f64>, sale: Option<f64>) -> Deal {
        let record = record(Some(discount), normal, sale);
        let (game, price) = deal_to_game_and_price(&record, "Steam", None);
        Deal {
            game,
            price,
            discount_percent: discount,
            normal_price: normal,
            sale_price: sale,
        }
    }

    #[test]
    fn sorts_by_discount_descending() {
        let mut deals = vec![deal(10.0, None, None), deal(90.0, None, None)];
        sort_deals(&mut deals, DealSort::Discount);
        assert!((deals[0].discount_percent - 90.0).abs() < 1e-9);
    }

    #[test]
    fn sorts_by_absolute_savings() {
        let mut deals = vec![
            deal(50.0, Some(10.0), Some(5.0)),
            deal(10.0, Some(60.0), Some(40.0)),
        ];
        sort_deals(&mut deals, DealSort::Savings);
        assert_eq!(deals[0].normal_price, Some(60.0));
    }

    #[test]
    fn sorts_by_price_with_missing_prices_last() {
        let mut deals = vec![
            deal(10.0, Some(60.0), None),
            deal(50.0, Some(10.0), Some(5.0)),
        ];
        sort_deals(&mut deals, DealSort::Price);
        assert_eq!(deals[0].sale_price, Some(5.0));
    }

    #[rstest]
    #[case::known("1", "Steam")]
    #[case::unknown("99", "Store 99")]
    fn store_names_fall_back_to_generic_label(#[case] id: &str, #[case] expected: &str) {
        let directory = fallback_store_directory();
        assert_eq!(store_display_name(id, &directory), expected);
    }

    #[test]
    fn genre_stats_count_unknown_and_resolved_genres() {
        let catalog: HashMap<i64, String> =
            [(4, "Shooter".to_owned()), (12, "RPG".to_owned())].into();
        let lists = vec![vec![4, 12], vec![], vec![999], vec![12]];

        let stats = build_genre_stats(&lists, &catalog);

        assert_eq!(stats.get("Shooter"), Some(&1));
        assert_eq!(stats.get("RPG"), Some(&2));
        assert_eq!(stats.get(UNKNOWN_GENRE), Some(&2));
    }

    #[test]
    fn genre_names_resolve_with_unknown_fallback() {
        let catalog: HashMap<i64, String> = [(4, "Shooter".to_owned())].into();
        assert_eq!(resolve_genre_names(&[4], &catalog), vec!["Shooter"]);
        assert_eq!(
            resolve_genre_names(&[999], &catalog),
            vec![UNKNOWN_GENRE.to_owned()]
        );
    }

    #[rstest]
    #[case::protocol_relative(
        Some("//images.igdb.com/t_thumb/co1.jpg"),
        Some("https://images.igdb.com/t_thumb/co1.jpg")
    )]
    #[case::already_https(
        Some("https://images.igdb.com/co1.jpg"),
        Some("https://images.igdb.com/co1.jpg")
    )]
    #[case::bare_host(Some("images.igdb.com/co1.jpg"), Some("https://images.igdb.com/co1.jpg"))]
    #[case::empty(Some("  "), None)]
    #[case::missing(None, None)]
    fn cover_urls_normalise_to_https(#[case] input: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(normalize_cover_url(input).as_deref(), expected);
    }

    #[rstest]
    #[case::epoch(Some(0), Some("1970-01-01"))]
    #[case::portal_release(Some(1_191_974_400), Some("2007-10-10"))]
    #[case::missing(None, None)]
    fn release_dates_convert_to_iso(#[case] ts: Option<i64>, #[case] expected: Option<&str>) {
        assert_eq!(release_date_from_timestamp(ts).as_deref(), expected);
    }
}
