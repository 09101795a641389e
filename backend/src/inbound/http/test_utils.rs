//! Shared helpers for HTTP handler tests.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test as actix_test, web, App, Error as ActixError};
use serde_json::{json, Value};

use crate::domain::{UserId, UserRole};
use crate::inbound::http::state::HttpState;

/// Password used by every test account.
pub(crate) const TEST_PASSWORD: &str = "correct horse battery";

/// Fresh in-memory state with a fixed signing secret.
pub(crate) fn test_state() -> HttpState {
    HttpState::in_memory("test-secret")
}

/// Build an app exposing every HTTP service against the given state.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = ActixError,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(super::auth::register)
        .service(super::auth::login)
        .service(super::auth::google_login)
        .service(super::auth::current_user)
        .service(super::users::list_users)
        .service(super::users::update_user)
        .service(super::users::update_user_status)
        .service(super::users::delete_user)
        .service(super::profile::get_profile)
        .service(super::profile::update_profile)
        .service(super::profile::update_preferences)
        .service(super::wishlist::get_wishlist)
        .service(super::wishlist::get_wishlist_ids)
        .service(super::wishlist::add_to_wishlist)
        .service(super::wishlist::remove_from_wishlist)
        .service(super::purchases::create_purchase)
        .service(super::purchases::get_my_purchases)
        .service(super::reviews::create_review)
        .service(super::reviews::list_reviews)
        .service(super::reviews::list_game_reviews)
        .service(super::reviews::list_user_reviews)
        .service(super::reviews::delete_review)
        .service(super::games::list_catalog_games)
        .service(super::games::list_deals)
        .service(super::games::trigger_etl)
        .service(super::admin::genre_stats)
        .service(super::admin::top_deals)
}

/// Register an account and log in, returning `(bearer token, user id)`.
pub(crate) async fn register_and_login<S, B>(app: &S, email: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = ActixError>,
    B: MessageBody,
{
    let registered = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(
        registered.status().is_success(),
        "registration failed for {email}"
    );
    let registered: Value = actix_test::read_body_json(registered).await;
    let user_id = registered
        .get("id")
        .and_then(Value::as_str)
        .expect("registered user id")
        .to_owned();

    (login(app, email).await, user_id)
}

/// Log an existing account in, returning the bearer token.
pub(crate) async fn login<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = ActixError>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login failed for {email}");
    let body: Value = actix_test::read_body_json(response).await;
    body.get("accessToken")
        .and_then(Value::as_str)
        .expect("access token")
        .to_owned()
}

/// Grant the admin role directly in the repository, then log in again so the
/// returned token carries the admin claim.
pub(crate) async fn promote_to_admin<S, B>(
    state: &HttpState,
    app: &S,
    user_id: &str,
    email: &str,
) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = ActixError>,
    B: MessageBody,
{
    let id = UserId::new(user_id).expect("valid user id");
    let mut user = state
        .users
        .find_by_id(&id)
        .await
        .expect("repository lookup")
        .expect("user exists");
    user.role = UserRole::Admin;
    state.users.update(&user).await.expect("role update");

    login(app, email).await
}
