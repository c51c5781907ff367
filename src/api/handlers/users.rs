//! `/users` resource handlers.
//!
//! Each handler is a single pass: extract, call the store once, write the
//! response. Not-found surfaces as a storage error (500) like any other.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use crate::api::extractors::{JsonBody, UserId};
use crate::api::response;
use crate::api::state::AppState;
use crate::domain::User;
use crate::error::Result;

/// `POST /users` - store a new user, respond 201 with the assigned id.
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(user): JsonBody<User>,
) -> Result<Response> {
    let stored = state.store.insert(user).await?;
    response::json(StatusCode::CREATED, &stored)
}

/// `GET /users` - every stored user, `[]` when empty.
pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let users = state.store.all().await?;
    response::json(StatusCode::OK, &users)
}

/// `GET /users/{id}`
pub async fn get_user(State(state): State<AppState>, UserId(id): UserId) -> Result<Response> {
    let user = state.store.get_by_id(id).await?;
    response::json(StatusCode::OK, &user)
}

/// `PUT /users/{id}` - full replace; the path id wins over any id in the body.
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    JsonBody(user): JsonBody<User>,
) -> Result<Response> {
    state.store.update(&user.with_id(id)).await?;
    Ok(response::empty(StatusCode::OK))
}

/// `DELETE /users/{id}`
pub async fn delete_user(State(state): State<AppState>, UserId(id): UserId) -> Result<Response> {
    state.store.delete(id).await?;
    Ok(response::empty(StatusCode::OK))
}
