//! Review HTTP handlers.
//!
//! ```text
//! POST   /reviews
//! GET    /reviews
//! GET    /reviews/game/{game_id}
//! GET    /reviews/user/{user_id}
//! DELETE /reviews/{id}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, GameReview, NewReview, Review, ReviewValidationError, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Stored review payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub game_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.to_string(),
            game_id: review.game_id,
            user_id: review.user_id.map(|id| id.to_string()),
            rating: review.rating.value(),
            comment: review.comment.into(),
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// Minimal author block attached to review listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A review paired with its author, when the author still exists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameReviewResponse {
    pub review: ReviewResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ReviewAuthor>,
}

impl From<GameReview> for GameReviewResponse {
    fn from(entry: GameReview) -> Self {
        Self {
            review: ReviewResponse::from(entry.review),
            user: entry.author.map(|author| ReviewAuthor {
                id: author.id.to_string(),
                name: author.display_name.map(|name| name.to_string()),
            }),
        }
    }
}

/// Review submission body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreateRequest {
    pub game_id: String,
    pub rating: i32,
    pub comment: String,
}

fn map_review_validation_error(err: ReviewValidationError) -> Error {
    match err {
        ReviewValidationError::RatingOutOfRange { .. } => field_error("rating", err),
        ReviewValidationError::CommentTooShort { .. }
        | ReviewValidationError::CommentTooLong { .. } => field_error("comment", err),
        ReviewValidationError::EmptyGameId => field_error("gameId", err),
    }
}

/// Create or replace the caller's review of a game.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = ReviewCreateRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ReviewCreateRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let review = NewReview::try_from_parts(
        &payload.game_id,
        caller.user_id,
        payload.rating,
        &payload.comment,
    )
    .map_err(map_review_validation_error)?;

    let stored = state.reviews.upsert(&review).await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(stored)))
}

/// List all reviews with their authors.
#[utoipa::path(
    get,
    path = "/reviews",
    responses(
        (status = 200, description = "Reviews", body = [GameReviewResponse])
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<GameReviewResponse>>> {
    let reviews = state.reviews.list_with_authors().await?;
    Ok(web::Json(
        reviews.into_iter().map(GameReviewResponse::from).collect(),
    ))
}

/// List reviews for one game.
#[utoipa::path(
    get,
    path = "/reviews/game/{game_id}",
    params(("game_id" = String, Path, description = "Namespaced game id")),
    responses(
        (status = 200, description = "Reviews for the game", body = [GameReviewResponse])
    ),
    tags = ["reviews"],
    operation_id = "listGameReviews",
    security([])
)]
#[get("/reviews/game/{game_id}")]
pub async fn list_game_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<GameReviewResponse>>> {
    let reviews = state.reviews.for_game(&path).await?;
    Ok(web::Json(
        reviews.into_iter().map(GameReviewResponse::from).collect(),
    ))
}

/// List reviews written by one user.
#[utoipa::path(
    get,
    path = "/reviews/user/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Reviews by the user", body = [ReviewResponse]),
        (status = 404, description = "Invalid user id", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listUserReviews",
    security([])
)]
#[get("/reviews/user/{user_id}")]
pub async fn list_user_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let user_id = UserId::new(path.as_str()).map_err(|_| Error::not_found("user not found"))?;
    let reviews = state.reviews.for_user(&user_id).await?;
    Ok(web::Json(
        reviews.into_iter().map(ReviewResponse::from).collect(),
    ))
}

/// Delete a review. Authors may delete their own; admins may delete any.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/reviews/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let review_id =
        Uuid::parse_str(&path).map_err(|_| Error::not_found("review not found"))?;
    let review = state
        .reviews
        .find(review_id)
        .await?
        .ok_or_else(|| Error::not_found("review not found"))?;

    let is_author = review.user_id == Some(caller.user_id);
    if !is_author && caller.require_admin().is_err() {
        return Err(Error::forbidden("only the author or an admin may delete"));
    }

    state.reviews.delete(review_id).await?;
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

    fn create_request(game_id: &str, rating: i32, token: &str) -> actix_web::test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/reviews")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(ReviewCreateRequest {
                game_id: game_id.to_owned(),
                rating,
                comment: "solid entry".to_owned(),
            })
    }

    #[actix_web::test]
    async fn create_and_list_reviews() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, user_id) = register_and_login(&app, "ada@example.com").await;

        let created =
            actix_test::call_service(&app, create_request("cs_612", 4, &token).to_request()).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/reviews").to_request(),
        )
        .await;
        assert_eq!(listing.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(listing).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let by_user = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/reviews/user/{user_id}"))
                .to_request(),
        )
        .await;
        let by_user: Value = actix_test::read_body_json(by_user).await;
        assert_eq!(by_user.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn resubmission_replaces_existing_review() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        actix_test::call_service(&app, create_request("cs_612", 2, &token).to_request()).await;
        actix_test::call_service(&app, create_request("cs_612", 5, &token).to_request()).await;

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/reviews/game/cs_612")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(listing).await;
        let entries = body.as_array().expect("array");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].pointer("/review/rating").and_then(Value::as_i64),
            Some(5)
        );
    }

    #[actix_web::test]
    async fn invalid_rating_is_rejected() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let response =
            actix_test::call_service(&app, create_request("cs_612", 9, &token).to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn only_author_or_admin_deletes() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (author_token, _) = register_and_login(&app, "ada@example.com").await;
        let (other_token, _) = register_and_login(&app, "grace@example.com").await;

        let created = actix_test::call_service(
            &app,
            create_request("cs_612", 4, &author_token).to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(created).await;
        let review_id = body.get("id").and_then(Value::as_str).expect("id").to_owned();

        let forbidden = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/reviews/{review_id}"))
                .insert_header(("Authorization", format!("Bearer {other_token}")))
                .to_request(),
        )
        .await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let deleted = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/reviews/{review_id}"))
                .insert_header(("Authorization", format!("Bearer {author_token}")))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }
}
