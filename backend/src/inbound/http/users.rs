//! Administrative user-management HTTP handlers.
//!
//! ```text
//! GET    /users
//! PUT    /users/{id}
//! PUT    /users/{id}/status
//! DELETE /users/{id}
//! ```
//!
//! All routes require the admin role.

use actix_web::{delete, get, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, User, UserId, UserRole, UserStatus};
use crate::inbound::http::schemas::UserResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token::AuthenticatedUser;
use crate::inbound::http::ApiResult;

/// Role/status update body for `PUT /users/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: UserRole,
    pub status: UserStatus,
}

/// Status update body for `PUT /users/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

async fn load_user(state: &HttpState, id: &str) -> Result<User, Error> {
    let user_id = UserId::new(id).map_err(|_| Error::not_found("user not found"))?;
    state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))
}

/// List all accounts.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    caller.require_admin()?;
    let users = state.users.list().await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Update an account's role and status.
#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateUserRequest,
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    caller.require_admin()?;
    let mut user = load_user(&state, &path).await?;
    user.role = payload.role;
    user.status = payload.status;
    state.users.update(&user).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Suspend or reactivate an account.
#[utoipa::path(
    put,
    path = "/users/{id}/status",
    request_body = UpdateUserStatusRequest,
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUserStatus"
)]
#[put("/users/{id}/status")]
pub async fn update_user_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserStatusRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    caller.require_admin()?;
    let mut user = load_user(&state, &path).await?;
    user.status = payload.status;
    state.users.update(&user).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    caller.require_admin()?;
    let user_id = UserId::new(path.as_str()).map_err(|_| Error::not_found("user not found"))?;
    if !state.users.delete(&user_id).await? {
        return Err(Error::not_found("user not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler tests against the in-memory state.
    use super::*;
    use crate::inbound::http::test_utils::{
        promote_to_admin, register_and_login, test_app, test_state,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn listing_requires_admin_role() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state.clone())).await;
        let (token, _) = register_and_login(&app, "ada@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/users")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admin_lists_and_updates_users() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state.clone())).await;
        let (_, member_id) = register_and_login(&app, "member@example.com").await;
        let (_, admin_id) = register_and_login(&app, "admin@example.com").await;
        let admin_token = promote_to_admin(&state, &app, &admin_id, "admin@example.com").await;

        let listing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/users")
                .insert_header(("Authorization", format!("Bearer {admin_token}")))
                .to_request(),
        )
        .await;
        assert_eq!(listing.status(), StatusCode::OK);
        let users: Value = actix_test::read_body_json(listing).await;
        assert_eq!(users.as_array().map(Vec::len), Some(2));

        let update = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/users/{member_id}/status"))
                .insert_header(("Authorization", format!("Bearer {admin_token}")))
                .set_json(&UpdateUserStatusRequest {
                    status: UserStatus::Suspended,
                })
                .to_request(),
        )
        .await;
        assert_eq!(update.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(update).await;
        assert_eq!(
            body.get("status").and_then(Value::as_str),
            Some("suspended")
        );
    }

    #[actix_web::test]
    async fn delete_reports_unknown_users() {
        let state = test_state();
        let app = actix_test::init_service(test_app(state.clone())).await;
        let (_, admin_id) = register_and_login(&app, "admin@example.com").await;
        let admin_token = promote_to_admin(&state, &app, &admin_id, "admin@example.com").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/users/{}", crate::domain::UserId::random()))
                .insert_header(("Authorization", format!("Bearer {admin_token}")))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
