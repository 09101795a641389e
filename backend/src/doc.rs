//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::domain;
use crate::inbound::http;

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Level Up API",
        description = "Game price comparison and review platform backend",
    ),
    paths(
        http::auth::register,
        http::auth::login,
        http::auth::google_login,
        http::auth::current_user,
        http::users::list_users,
        http::users::update_user,
        http::users::update_user_status,
        http::users::delete_user,
        http::profile::get_profile,
        http::profile::update_profile,
        http::profile::update_preferences,
        http::wishlist::get_wishlist,
        http::wishlist::get_wishlist_ids,
        http::wishlist::add_to_wishlist,
        http::wishlist::remove_from_wishlist,
        http::purchases::create_purchase,
        http::purchases::get_my_purchases,
        http::reviews::create_review,
        http::reviews::list_reviews,
        http::reviews::list_game_reviews,
        http::reviews::list_user_reviews,
        http::reviews::delete_review,
        http::games::list_catalog_games,
        http::games::list_deals,
        http::games::trigger_etl,
        http::admin::genre_stats,
        http::admin::top_deals,
        http::health::ready,
        http::health::live,
    ),
    components(schemas(
        domain::Error,
        domain::error::ErrorCode,
        domain::Game,
        domain::GamePrice,
        domain::Deal,
        domain::CatalogGame,
        http::schemas::UserResponse,
        http::schemas::TokenResponse,
        http::schemas::MessageResponse,
        http::auth::RegisterRequest,
        http::auth::LoginRequest,
        http::auth::GoogleAuthRequest,
        http::users::UpdateUserRequest,
        http::users::UpdateUserStatusRequest,
        http::profile::ProfileResponse,
        http::profile::ProfileUpdateRequest,
        http::profile::PreferencesUpdateRequest,
        http::profile::PreferencesResponse,
        http::wishlist::WishlistEntryResponse,
        http::wishlist::WishlistCreateRequest,
        http::purchases::PurchaseResponse,
        http::purchases::PurchaseCreateRequest,
        http::reviews::ReviewResponse,
        http::reviews::GameReviewResponse,
        http::reviews::ReviewCreateRequest,
        http::games::CatalogPageResponse,
        http::games::DealsPageResponse,
        http::games::EtlSummaryResponse,
        http::admin::GenreStatsResponse,
        http::admin::TopDealsResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_core_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("document serialises");
        let paths = json.get("paths").and_then(|v| v.as_object()).expect("paths");

        for path in [
            "/auth/login",
            "/games/deals",
            "/admin/top-deals",
            "/wishlist/{game_id}",
            "/health/ready",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }
}
