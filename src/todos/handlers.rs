use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app::not_found,
    auth::extractors::{AdminUser, AuthUser},
    error::AppResult,
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, CreatedTodoResponse, MessageResponse, UpdateTodoRequest},
        repo_types::{Todo, TodoFilter},
        services,
    },
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo).fallback(not_found),
        )
        .route(
            "/todos/:id",
            get(get_todo)
                .patch(update_todo)
                .delete(delete_todo)
                .fallback(not_found),
        )
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    filter: Result<Query<TodoFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Todo>>> {
    let Query(filter) = filter?;
    Ok(Json(services::list(&state, filter).await?))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Todo>> {
    let Path(id) = id?;
    Ok(Json(services::get_by_id(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedTodoResponse>)> {
    let Json(payload) = payload?;
    let new_todo = services::create(&state, payload.validate()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedTodoResponse {
            message: "Todo created successfully",
            new_todo,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    services::update(&state, id, payload.validate()?).await?;
    Ok(Json(MessageResponse {
        message: format!("Todo with id {id} updated successfully"),
    }))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    services::delete(&state, id).await?;
    Ok(Json(MessageResponse {
        message: format!("Todo with id {id} deleted successfully"),
    }))
}
