//! Account and authentication HTTP handlers.
//!
//! ```text
//! POST /auth/register {"email":"ada@example.com","password":"..."}
//! POST /auth/login    {"email":"ada@example.com","password":"..."}
//! POST /auth/google   {"token":"<google id token>"}
//! GET  /auth/me
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RegistrationRequest;
use crate::domain::{
    validate_password, DisplayName, EmailAddress, Error, LoginCredentials, LoginValidationError,
};
use crate::inbound::http::schemas::{TokenResponse, UserResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    /// Google-issued ID token.
    pub token: String,
}

fn parse_registration(payload: RegisterRequest) -> Result<RegistrationRequest, Error> {
    let email = EmailAddress::new(payload.email).map_err(|err| field_error("email", err))?;
    let display_name = payload
        .name
        .map(|name| DisplayName::new(name).map_err(|err| field_error("name", err)))
        .transpose()?;
    validate_password(&payload.password).map_err(|err| field_error("password", err))?;
    Ok(RegistrationRequest {
        email,
        display_name,
        password: payload.password,
    })
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => field_error("email", err),
        LoginValidationError::EmptyPassword => field_error("password", err),
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_registration(payload.into_inner())?;
    let user = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Authenticate with email and password, returning a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account suspended", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_login_validation_error)?;
    let user = state.accounts.login(&credentials).await?;
    let token = state.tokens.issue(&user)?;
    Ok(web::Json(TokenResponse::bearer(token, &user)))
}

/// Login or sign up with a Google ID token.
#[utoipa::path(
    post,
    path = "/auth/google",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 401, description = "Invalid Google token", body = Error),
        (status = 502, description = "Google verification unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "googleLogin",
    security([])
)]
#[post("/auth/google")]
pub async fn google_login(
    state: web::Data<HttpState>,
    payload: web::Json<GoogleAuthRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let user = state.accounts.login_with_google(&payload.token).await?;
    let token = state.tokens.issue(&user)?;
    Ok(web::Json(TokenResponse::bearer(token, &user)))
}

/// Return the authenticated account.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts.fetch_user(&caller.user_id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}
