//! To-do endpoints.
//!
//! Every endpoint answers 200 with the request's envelope, whether it
//! carries data or an error. Only unreadable input (400) and unhandled
//! faults (500) use other statuses.

use std::sync::Arc;

use application::todo::registry;
use application::{
    CreateTodo, DeleteTodo, Envelope, GetAllTodos, GetTodo, Handler, TodoResponse, UpdateTodo,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use common::TodoId;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::AppState;

/// GET /todo — list every item, lowest priority value first.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
) -> Result<Json<Envelope<Vec<TodoResponse>>>, ApiError> {
    let envelope = registry::get_all_todos(state.session(user))
        .handle(GetAllTodos)
        .await?;
    Ok(Json(envelope))
}

/// GET /todo/{id} — load one item.
#[tracing::instrument(skip(state, id))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<Envelope<TodoResponse>>, ApiError> {
    let Path(id) = id?;
    let envelope = registry::get_todo(state.session(user))
        .handle(GetTodo::new(id))
        .await?;
    Ok(Json(envelope))
}

/// POST /todo — create an item.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Json<Envelope<TodoResponse>>, ApiError> {
    let Json(request) = payload?;
    let envelope = registry::create_todo(state.session(user))
        .handle(request)
        .await?;
    Ok(Json(envelope))
}

/// PATCH /todo — update an item; the ID travels in the body.
#[tracing::instrument(skip(state, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Envelope<TodoResponse>>, ApiError> {
    let Json(request) = payload?;
    let envelope = registry::update_todo(state.session(user))
        .handle(request)
        .await?;
    Ok(Json(envelope))
}

/// DELETE /todo/{id} — remove an item.
#[tracing::instrument(skip(state, id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Caller(user): Caller,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<Envelope<bool>>, ApiError> {
    let Path(id) = id?;
    let envelope = registry::delete_todo(state.session(user))
        .handle(DeleteTodo::new(id))
        .await?;
    Ok(Json(envelope))
}
