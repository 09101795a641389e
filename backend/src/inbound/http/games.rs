//! Game catalog HTTP handlers.
//!
//! ```text
//! GET  /games?limit=500
//! GET  /games/deals?search=&page_size=30&enrich=false
//! POST /games/etl?search=
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CatalogGame, Error, Game, GamePrice, IGDB_GAME_LIMIT};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::ApiResult;

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
pub struct CatalogQueryParams {
    pub limit: Option<u32>,
}

/// Query parameters for the deals listing.
#[derive(Debug, Deserialize)]
pub struct DealsQueryParams {
    pub search: Option<String>,
    pub page_size: Option<u32>,
    /// Enable best-effort genre enrichment.
    pub enrich: Option<bool>,
}

/// Query parameters for the legacy fetch trigger.
#[derive(Debug, Deserialize)]
pub struct EtlQueryParams {
    pub search: Option<String>,
}

/// Catalog page payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPageResponse {
    pub count: usize,
    pub games: Vec<CatalogGame>,
}

/// Deals page payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealsPageResponse {
    pub games: Vec<Game>,
    pub prices: Vec<GamePrice>,
}

/// Summary payload for the legacy fetch trigger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EtlSummaryResponse {
    pub status: String,
    pub timestamp: String,
    pub games_processed: usize,
    pub prices_processed: usize,
}

/// List catalog games with resolved genres and cover URLs.
///
/// Serves IGDB data only; degrades to an empty page when the upstream is
/// unavailable.
#[utoipa::path(
    get,
    path = "/games",
    params(("limit" = Option<u32>, Query, description = "Maximum games, clamped to 1-500")),
    responses(
        (status = 200, description = "Catalog games", body = CatalogPageResponse)
    ),
    tags = ["games"],
    operation_id = "listCatalogGames",
    security([])
)]
#[get("/games")]
pub async fn list_catalog_games(
    state: web::Data<HttpState>,
    query: web::Query<CatalogQueryParams>,
) -> ApiResult<web::Json<CatalogPageResponse>> {
    let limit = query.limit.unwrap_or(IGDB_GAME_LIMIT);
    let page = state.catalog.catalog_games(limit).await?;
    Ok(web::Json(CatalogPageResponse {
        count: page.count,
        games: page.games,
    }))
}

/// Fetch current deals reshaped into games and prices.
#[utoipa::path(
    get,
    path = "/games/deals",
    params(
        ("search" = Option<String>, Query, description = "Title filter"),
        ("page_size" = Option<u32>, Query, description = "Deals to fetch, clamped to 1-200"),
        ("enrich" = Option<bool>, Query, description = "Enable best-effort genre enrichment")
    ),
    responses(
        (status = 200, description = "Deals page", body = DealsPageResponse),
        (status = 502, description = "Upstream failure", body = Error)
    ),
    tags = ["games"],
    operation_id = "listDeals",
    security([])
)]
#[get("/games/deals")]
pub async fn list_deals(
    state: web::Data<HttpState>,
    query: web::Query<DealsQueryParams>,
) -> ApiResult<web::Json<DealsPageResponse>> {
    let query = query.into_inner();
    let page = state
        .catalog
        .deals(
            query.search.as_deref(),
            query.page_size.unwrap_or(30),
            query.enrich.unwrap_or(false),
        )
        .await?;
    Ok(web::Json(DealsPageResponse {
        games: page.games,
        prices: page.prices,
    }))
}

/// Legacy trigger running the fetch-and-transform pass.
#[utoipa::path(
    post,
    path = "/games/etl",
    params(("search" = Option<String>, Query, description = "Title filter")),
    responses(
        (status = 200, description = "Run summary", body = EtlSummaryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 502, description = "Upstream failure", body = Error)
    ),
    tags = ["games"],
    operation_id = "triggerEtl"
)]
#[post("/games/etl")]
pub async fn trigger_etl(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<EtlQueryParams>,
) -> ApiResult<web::Json<EtlSummaryResponse>> {
    let summary = state.catalog.run_etl(query.search.as_deref()).await?;
    Ok(web::Json(EtlSummaryResponse {
        status: summary.status,
        timestamp: summary.timestamp.to_rfc3339(),
        games_processed: summary.games_processed,
        prices_processed: summary.prices_processed,
    }))
}

#[cfg(test)]
mod tests {
    //! Handler tests against the in-memory state.
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn catalog_listing_is_public() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/games?limit=500")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("count").and_then(Value::as_u64), Some(2));
        let games = body.get("games").and_then(Value::as_array).expect("games");
        assert_eq!(
            games[0].get("releaseDate").and_then(Value::as_str),
            Some("2007-10-10")
        );
    }

    #[actix_web::test]
    async fn deals_listing_reshapes_games_and_prices() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/games/deals?search=portal")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let games = body.get("games").and_then(Value::as_array).expect("games");
        let prices = body.get("prices").and_then(Value::as_array).expect("prices");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].get("id").and_then(Value::as_str), Some("cs_612"));
        assert_eq!(
            prices[0].get("store").and_then(Value::as_str),
            Some("Steam")
        );
    }

    #[actix_web::test]
    async fn etl_trigger_requires_authentication() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;

        let anonymous = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/games/etl").to_request(),
        )
        .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let (token, _) = register_and_login(&app, "ada@example.com").await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/games/etl")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("status").and_then(Value::as_str),
            Some("completed")
        );
        assert_eq!(body.get("gamesProcessed").and_then(Value::as_u64), Some(2));
    }
}
