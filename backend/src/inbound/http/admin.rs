//! Admin dashboard HTTP handlers.
//!
//! ```text
//! GET /admin/genres
//! GET /admin/top-deals?min_discount=60&limit=30&sort=discount
//! ```
//!
//! These endpoints feed dashboard charts; like the original API they are
//! served without authentication.

use std::collections::BTreeMap;

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::TopDealsQuery;
use crate::domain::{Deal, DealSort, Error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Genre statistics payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenreStatsResponse {
    /// Number of games sampled.
    pub count: usize,
    /// Genre name to occurrence count.
    pub genre_stats: BTreeMap<String, u64>,
}

/// Top-deals payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopDealsResponse {
    pub deals: Vec<Deal>,
}

/// Query parameters for the top-deals listing.
#[derive(Debug, Deserialize)]
pub struct TopDealsParams {
    pub search: Option<String>,
    pub min_discount: Option<f64>,
    pub limit: Option<u32>,
    /// `discount`, `savings`, or `price`; unknown values fall back to
    /// `discount`.
    pub sort: Option<String>,
}

/// Genre statistics over a fixed window of catalog games.
#[utoipa::path(
    get,
    path = "/admin/genres",
    responses(
        (status = 200, description = "Genre statistics", body = GenreStatsResponse)
    ),
    tags = ["admin"],
    operation_id = "adminGenreStats",
    security([])
)]
#[get("/admin/genres")]
pub async fn genre_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<GenreStatsResponse>> {
    let report = state.catalog.genre_stats().await?;
    Ok(web::Json(GenreStatsResponse {
        count: report.count,
        genre_stats: report.genre_stats,
    }))
}

/// Deals filtered by minimum discount and sorted.
#[utoipa::path(
    get,
    path = "/admin/top-deals",
    params(
        ("search" = Option<String>, Query, description = "Title filter"),
        ("min_discount" = Option<f64>, Query, description = "Minimum discount percent, clamped to 0-100"),
        ("limit" = Option<u32>, Query, description = "Maximum deals, clamped to 1-200"),
        ("sort" = Option<String>, Query, description = "discount | savings | price")
    ),
    responses(
        (status = 200, description = "Filtered deals", body = TopDealsResponse),
        (status = 502, description = "Upstream failure", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminTopDeals",
    security([])
)]
#[get("/admin/top-deals")]
pub async fn top_deals(
    state: web::Data<HttpState>,
    query: web::Query<TopDealsParams>,
) -> ApiResult<web::Json<TopDealsResponse>> {
    let query = query.into_inner();
    let deals = state
        .catalog
        .top_deals(TopDealsQuery {
            search: query.search,
            min_discount: query.min_discount.unwrap_or(60.0),
            limit: query.limit.unwrap_or(30),
            sort: query
                .sort
                .as_deref()
                .map(DealSort::parse_lenient)
                .unwrap_or_default(),
        })
        .await?;
    Ok(web::Json(TopDealsResponse { deals }))
}

#[cfg(test)]
mod tests {
    //! Handler tests against the in-memory state.
    use super::*;
    use crate::inbound::http::test_utils::{test_app, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn genre_stats_report_counts() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/admin/genres").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("count").and_then(Value::as_u64), Some(2));
        assert_eq!(
            body.pointer("/genreStats/Unknown").and_then(Value::as_u64),
            Some(1)
        );
    }

    #[actix_web::test]
    async fn top_deals_filter_by_discount() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/top-deals?min_discount=60")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let deals = body.get("deals").and_then(Value::as_array).expect("deals");
        assert_eq!(deals.len(), 1);
        assert_eq!(
            deals[0].pointer("/game/title").and_then(Value::as_str),
            Some("Portal")
        );
    }

    #[actix_web::test]
    async fn unknown_sort_falls_back_to_discount() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/top-deals?min_discount=0&sort=garbage")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let deals = body.get("deals").and_then(Value::as_array).expect("deals");
        assert_eq!(deals.len(), 2);
        let first = deals[0]
            .get("discountPercent")
            .and_then(Value::as_f64)
            .expect("discount");
        let second = deals[1]
            .get("discountPercent")
            .and_then(Value::as_f64)
            .expect("discount");
        assert!(first >= second);
    }
}
