//! User management endpoints. All admin-gated at the router.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::auth;
use crate::db::repository::user::{self, UserFields};
use crate::models::{Role, User};

#[derive(Serialize)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub notice: Option<Notice>,
}

/// `GET /users` — all accounts, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let users = user::list_users(&conn).map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(consumed, Json(UsersPage { users, notice: flash })))
}

#[derive(Serialize)]
pub struct AddUserPage {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

/// `GET /add_user` — creation form payload.
pub async fn add_form(headers: HeaderMap) -> Response {
    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    notice::page(
        consumed,
        Json(AddUserPage {
            page: "add_user",
            notice: flash,
        }),
    )
}

#[derive(Deserialize)]
pub struct NewUserForm {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
}

/// `POST /add_user` — create an account; the password is hashed before it
/// reaches the store.
pub async fn create(
    State(ctx): State<ApiContext>,
    Form(form): Form<NewUserForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let password_hash = auth::hash_password(&form.password);

    user::insert_user(
        &conn,
        &UserFields {
            username: &form.username,
            role: form.role,
            full_name: &form.full_name,
            email: &form.email,
        },
        &password_hash,
    )
    .map_err(ApiError::db("/add_user"))?;

    tracing::info!(username = %form.username, role = %form.role, "user created");
    Ok(notice::redirect_with_notice(
        "/users",
        Notice::success("User created successfully!"),
    ))
}

#[derive(Serialize)]
pub struct EditUserPage {
    pub user: User,
    pub notice: Option<Notice>,
}

/// `GET /edit_user/:id` — edit form prefill.
pub async fn edit_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let user = user::get_user(&conn, id).map_err(ApiError::db("/users"))?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(consumed, Json(EditUserPage { user, notice: flash })))
}

#[derive(Deserialize)]
pub struct EditUserForm {
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    /// Blank means "keep the current password".
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /edit_user/:id` — replace the account; rehash only when a new
/// password was supplied.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Form(form): Form<EditUserForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;

    let new_hash = form
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(auth::hash_password);

    user::update_user(
        &conn,
        id,
        &UserFields {
            username: &form.username,
            role: form.role,
            full_name: &form.full_name,
            email: &form.email,
        },
        new_hash.as_deref(),
    )
    .map_err(ApiError::db("/users"))?;

    Ok(notice::redirect_with_notice(
        "/users",
        Notice::success("User updated successfully!"),
    ))
}

/// `GET /delete_user/:id` — unconditional delete; a missing id still
/// reports success.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    user::delete_user(&conn, id).map_err(ApiError::db("/users"))?;

    Ok(notice::redirect_with_notice(
        "/users",
        Notice::success("User deleted successfully!"),
    ))
}
