use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    todos::repo_types::{NewTodo, Todo, TodoChanges, TodoFilter},
};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Todo with id {id} not found"))
}

pub async fn list(state: &AppState, filter: TodoFilter) -> AppResult<Vec<Todo>> {
    Ok(state.todos.list(filter).await?)
}

pub async fn create(state: &AppState, todo: NewTodo) -> AppResult<Todo> {
    let todo = state.todos.create(todo).await?;
    info!(todo_id = %todo.id, "todo created");
    Ok(todo)
}

pub async fn get_by_id(state: &AppState, id: Uuid) -> AppResult<Todo> {
    state.todos.find_by_id(id).await?.ok_or_else(|| not_found(id))
}

pub async fn update(state: &AppState, id: Uuid, changes: TodoChanges) -> AppResult<()> {
    state
        .todos
        .update(id, changes)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!(todo_id = %id, "todo updated");
    Ok(())
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.todos.delete(id).await? {
        return Err(not_found(id));
    }
    info!(todo_id = %id, "todo deleted");
    Ok(())
}
