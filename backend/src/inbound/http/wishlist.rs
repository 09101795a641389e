//! Wishlist HTTP handlers.
//!
//! ```text
//! GET    /wishlist
//! GET    /wishlist/ids
//! POST   /wishlist
//! DELETE /wishlist/{game_id}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NewWishlistEntry, WishlistEntry};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Wishlist entry payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntryResponse {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub game_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    pub added_at: String,
}

impl From<WishlistEntry> for WishlistEntryResponse {
    fn from(entry: WishlistEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            user_id: entry.user_id.to_string(),
            game_id: entry.game_id,
            game_title: entry.game_title,
            image_url: entry.image_url,
            price: entry.price,
            original_price: entry.original_price,
            discount_percent: entry.discount_percent,
            store_id: entry.store_id,
            deal_id: entry.deal_id,
            added_at: entry.added_at.to_rfc3339(),
        }
    }
}

/// Add-to-wishlist request body with deal snapshot fields.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistCreateRequest {
    pub game_id: String,
    pub game_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
}

/// List the current user's wishlist, newest first.
#[utoipa::path(
    get,
    path = "/wishlist",
    responses(
        (status = 200, description = "Wishlist entries", body = [WishlistEntryResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "getWishlist"
)]
#[get("/wishlist")]
pub async fn get_wishlist(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<WishlistEntryResponse>>> {
    let entries = state.wishlist.list_for_user(&caller.user_id).await?;
    Ok(web::Json(
        entries.into_iter().map(WishlistEntryResponse::from).collect(),
    ))
}

/// List just the wishlisted game ids.
#[utoipa::path(
    get,
    path = "/wishlist/ids",
    responses(
        (status = 200, description = "Wishlisted game ids", body = [String]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "getWishlistIds"
)]
#[get("/wishlist/ids")]
pub async fn get_wishlist_ids(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<String>>> {
    let ids = state.wishlist.game_ids_for_user(&caller.user_id).await?;
    Ok(web::Json(ids))
}

/// Add a game to the current user's wishlist.
#[utoipa::path(
    post,
    path = "/wishlist",
    request_body = WishlistCreateRequest,
    responses(
        (status = 201, description = "Entry added", body = WishlistEntryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Already wishlisted", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "addToWishlist"
)]
#[post("/wishlist")]
pub async fn add_to_wishlist(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<WishlistCreateRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let entry = NewWishlistEntry {
        user_id: caller.user_id,
        game_id: payload.game_id,
        game_title: payload.game_title,
        image_url: payload.image_url,
        price: payload.price,
        original_price: payload.original_price,
        discount_percent: payload.discount_percent,
        store_id: payload.store_id,
        deal_id: payload.deal_id,
    };
    entry.validate().map_err(|err| field_error("gameId", err))?;

    let stored = state.wishlist.insert(&entry).await?;
    Ok(HttpResponse::Created().json(WishlistEntryResponse::from(stored)))
}

/// Remove a game from the current user's wishlist.
#[utoipa::path(
    delete,
    path = "/wishlist/{game_id}",
    params(("game_id" = String, Path, description = "Namespaced game id")),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not in wishlist", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "removeFromWishlist"
)]
#[delete("/wishlist/{game_id}")]
pub async fn remove_from_wishlist(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let removed = state.wishlist.remove(&caller.user_id, &path).await?;
    if !removed {
        return Err(Error::not_found("game not found in wishlist"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler tests against the in-memory state.
    use super::*;
    use crate::inbound::http::test_utils::{register_and_login, test_app, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    fn create_request(game_id: &str, token: &str) -> actix_web::test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/wishlist")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(WishlistCreateRequest {
                game_id: game_id.to_owned(),
                game_title: "Portal".to_owned(),
                image_url: None,
                price: Some(1.99),
                original_price: Some(9.99),
                discount_percent: Some(80),
                store_id: Some("1".to_owned()),
                deal_id: Some("deal-portal".to_owned()),
            })
    }

    #[actix_web::test]
    async fn add_list_and_remove_round_trip() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let created =
            actix_test::call_service(&app, create_request("cs_612", &token).to_request()).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/wishlist")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(listing).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let ids = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/wishlist/ids")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        let ids: Value = actix_test::read_body_json(ids).await;
        assert_eq!(ids.as_array().and_then(|a| a[0].as_str()), Some("cs_612"));

        let removed = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/wishlist/cs_612")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn duplicate_entries_conflict() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let first =
            actix_test::call_service(&app, create_request("cs_612", &token).to_request()).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let second =
            actix_test::call_service(&app, create_request("cs_612", &token).to_request()).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn removing_absent_entry_is_not_found() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/wishlist/cs_404")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
