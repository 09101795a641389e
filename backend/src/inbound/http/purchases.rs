//! Purchase HTTP handlers.
//!
//! ```text
//! POST /purchases
//! GET  /purchases/me?limit=10
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{clamp_purchase_limit, NewPurchase, Purchase};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Purchase record payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub game_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    pub purchased_at: String,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id.to_string(),
            user_id: purchase.user_id.to_string(),
            game_id: purchase.game_id,
            game_title: purchase.game_title,
            image_url: purchase.image_url,
            genre: purchase.genre,
            price: purchase.price,
            store: purchase.store,
            purchased_at: purchase.purchased_at.to_rfc3339(),
        }
    }
}

/// Purchase creation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreateRequest {
    pub game_id: String,
    pub game_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    pub limit: Option<i64>,
}

/// Record a purchase for the current user.
#[utoipa::path(
    post,
    path = "/purchases",
    request_body = PurchaseCreateRequest,
    responses(
        (status = 201, description = "Purchase recorded", body = PurchaseResponse),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Unauthorised", body = crate::domain::Error)
    ),
    tags = ["purchases"],
    operation_id = "createPurchase"
)]
#[post("/purchases")]
pub async fn create_purchase(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<PurchaseCreateRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let purchase = NewPurchase {
        user_id: caller.user_id,
        game_id: payload.game_id,
        game_title: payload.game_title,
        image_url: payload.image_url,
        genre: payload.genre,
        price: payload.price,
        store: payload.store,
    };
    purchase.validate().map_err(|err| field_error("gameId", err))?;

    let stored = state.purchases.insert(&purchase).await?;
    state
        .users
        .increment_purchase_count(&caller.user_id)
        .await?;
    Ok(HttpResponse::Created().json(PurchaseResponse::from(stored)))
}

/// List the current user's most recent purchases.
#[utoipa::path(
    get,
    path = "/purchases/me",
    params(("limit" = Option<i64>, Query, description = "Maximum rows, clamped to 1-50")),
    responses(
        (status = 200, description = "Recent purchases", body = [PurchaseResponse]),
        (status = 401, description = "Unauthorised", body = crate::domain::Error)
    ),
    tags = ["purchases"],
    operation_id = "getMyPurchases"
)]
#[get("/purchases/me")]
pub async fn get_my_purchases(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<PurchaseListQuery>,
) -> ApiResult<web::Json<Vec<PurchaseResponse>>> {
    let limit = clamp_purchase_limit(query.limit);
    let purchases = state
        .purchases
        .recent_for_user(&caller.user_id, limit)
        .await?;
    Ok(web::Json(
        purchases.into_iter().map(PurchaseResponse::from).collect(),
    ))
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
            .uri("/purchases")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(PurchaseCreateRequest {
                game_id: game_id.to_owned(),
                game_title: format!("Game {game_id}"),
                image_url: None,
                genre: Some("Puzzle".to_owned()),
                price: Some(1.99),
                store: Some("Steam".to_owned()),
            })
    }

    #[actix_web::test]
    async fn purchases_increment_counter_and_list() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        for game in ["cs_1", "cs_2"] {
            let created =
                actix_test::call_service(&app, create_request(game, &token).to_request()).await;
            assert_eq!(created.status(), StatusCode::CREATED);
        }

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/purchases/me?limit=1")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(listing.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(listing).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let me = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/auth/me")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        let me: Value = actix_test::read_body_json(me).await;
        assert_eq!(me.get("purchaseCount").and_then(Value::as_i64), Some(2));
    }

    #[actix_web::test]
    async fn blank_game_id_is_rejected() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let response =
            actix_test::call_service(&app, create_request("  ", &token).to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
