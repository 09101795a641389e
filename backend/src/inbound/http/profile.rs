//! Profile and preferences HTTP handlers.
//!
//! ```text
//! GET /profile
//! PUT /profile
//! PUT /profile/preferences
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    validate_password, DisplayName, EmailAddress, Error, PreferencesUpdate, ProfileUpdate,
    ProfileView,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Identity block of the profile payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBlock {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub member_since: String,
    pub last_login: String,
}

/// Counter block of the profile payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsBlock {
    pub wishlist_items: u64,
    pub total_saved: f64,
    pub games_tracked: u64,
    pub price_alerts: u64,
    pub reviews_written: u64,
}

/// Preferences block of the profile payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favourite_genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_store: Option<String>,
}

/// Complete profile payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: ProfileBlock,
    pub statistics: StatisticsBlock,
    pub preferences: PreferencesBlock,
    /// Activity feed; empty until activity tracking lands.
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<serde_json::Value>,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            profile: ProfileBlock {
                id: view.profile.id.to_string(),
                name: view.profile.name.map(|name| name.to_string()),
                email: view.profile.email.to_string(),
                role: view.profile.role.to_string(),
                avatar: view.profile.avatar,
                member_since: view.profile.member_since.to_rfc3339(),
                last_login: view.profile.last_login.to_rfc3339(),
            },
            statistics: StatisticsBlock {
                wishlist_items: view.statistics.wishlist_items,
                total_saved: view.statistics.total_saved,
                games_tracked: view.statistics.games_tracked,
                price_alerts: view.statistics.price_alerts,
                reviews_written: view.statistics.reviews_written,
            },
            preferences: PreferencesBlock {
                favourite_genre: view.preferences.favourite_genre,
                preferred_store: view.preferences.preferred_store,
            },
            activities: Vec::new(),
        }
    }
}

/// Partial profile update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial preferences update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favourite_genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_store: Option<String>,
}

/// Preferences echo returned after an update.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub message: String,
    pub favourite_genre: Option<String>,
    pub preferred_store: Option<String>,
}

fn parse_profile_update(payload: ProfileUpdateRequest) -> Result<ProfileUpdate, Error> {
    let name = payload
        .name
        .map(|name| DisplayName::new(name).map_err(|err| field_error("name", err)))
        .transpose()?;
    let email = payload
        .email
        .map(|email| EmailAddress::new(email).map_err(|err| field_error("email", err)))
        .transpose()?;
    if let Some(password) = &payload.password {
        validate_password(password).map_err(|err| field_error("password", err))?;
    }
    Ok(ProfileUpdate {
        name,
        email,
        password: payload.password,
        avatar: payload.avatar,
    })
}

/// Fetch the authenticated user's profile with statistics and preferences.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile data", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = state.accounts.fetch_user(&caller.user_id).await?;
    let wishlist_items = state.wishlist.count_for_user(&caller.user_id).await?;
    let reviews_written = state.reviews.count_for_user(&caller.user_id).await?;

    let view = ProfileView::assemble(&user, wishlist_items, reviews_written);
    Ok(web::Json(ProfileResponse::from(view)))
}

/// Update the authenticated user's profile fields.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Email already exists", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<crate::inbound::http::schemas::MessageResponse>> {
    let update = parse_profile_update(payload.into_inner())?;
    state.accounts.update_profile(&caller.user_id, update).await?;
    Ok(web::Json(crate::inbound::http::schemas::MessageResponse::new(
        "Profile updated successfully",
    )))
}

/// Update the authenticated user's gaming preferences.
#[utoipa::path(
    put,
    path = "/profile/preferences",
    request_body = PreferencesUpdateRequest,
    responses(
        (status = 200, description = "Preferences updated", body = PreferencesResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updatePreferences"
)]
#[put("/profile/preferences")]
pub async fn update_preferences(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<PreferencesUpdateRequest>,
) -> ApiResult<web::Json<PreferencesResponse>> {
    let payload = payload.into_inner();
    let user = state
        .accounts
        .update_preferences(
            &caller.user_id,
            PreferencesUpdate {
                favourite_genre: payload.favourite_genre,
                preferred_store: payload.preferred_store,
            },
        )
        .await?;

    Ok(web::Json(PreferencesResponse {
        message: "Preferences updated successfully".to_owned(),
        favourite_genre: user.favourite_genre,
        preferred_store: user.preferred_store,
    }))
}
