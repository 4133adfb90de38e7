use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{AppError, AppResult},
    todos::repo_types::{NewTodo, Todo, TodoChanges, TodoPriority, TodoStatus},
};

/// Body of `POST /todos`. Everything is optional here so that missing
/// fields can be reported together.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
}

/// Body of `PATCH /todos/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTodoResponse {
    pub message: &'static str,
    pub new_todo: Todo,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// Distinguishes `"description": null` from an absent key.
fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

fn parse_status(raw: &str) -> AppResult<TodoStatus> {
    TodoStatus::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("{raw} is not in the option, for status")))
}

fn parse_priority(raw: &str) -> AppResult<TodoPriority> {
    TodoPriority::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("{raw} is not in the option, for priority")))
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

impl CreateTodoRequest {
    pub fn validate(self) -> AppResult<NewTodo> {
        let title = non_empty(self.title);
        let status = non_empty(self.status);
        let priority = non_empty(self.priority);

        let (Some(title), Some(status), Some(priority)) = (&title, &status, &priority) else {
            let missing: Vec<&str> = [
                ("title", title.is_none()),
                ("status", status.is_none()),
                ("priority", priority.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(AppError::BadRequest(format!("missing field: {}", missing.join(", "))));
        };

        Ok(NewTodo {
            status: parse_status(status)?,
            priority: parse_priority(priority)?,
            title: title.clone(),
            description: self.description,
        })
    }
}

impl UpdateTodoRequest {
    pub fn validate(self) -> AppResult<TodoChanges> {
        if self.title.as_deref() == Some("") {
            return Err(AppError::BadRequest("title must not be empty".into()));
        }
        Ok(TodoChanges {
            status: self.status.as_deref().map(parse_status).transpose()?,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            title: self.title,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: serde_json::Value) -> AppResult<NewTodo> {
        serde_json::from_value::<CreateTodoRequest>(body).unwrap().validate()
    }

    fn update(body: serde_json::Value) -> AppResult<TodoChanges> {
        serde_json::from_value::<UpdateTodoRequest>(body).unwrap().validate()
    }

    #[test]
    fn lists_exactly_the_missing_fields() {
        let err = create(json!({"status": "pending", "priority": "low"})).unwrap_err();
        assert_eq!(err.to_string(), "missing field: title");

        let err = create(json!({"title": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "missing field: status, priority");

        let err = create(json!({"title": "", "status": "pending"})).unwrap_err();
        assert_eq!(err.to_string(), "missing field: title, priority");

        let err = create(json!({})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "missing field: title, status, priority");
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let err =
            create(json!({"title": "x", "status": "archived", "priority": "low"})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "archived is not in the option, for status");

        let err =
            create(json!({"title": "x", "status": "pending", "priority": "urgent"})).unwrap_err();
        assert_eq!(err.to_string(), "urgent is not in the option, for priority");
    }

    #[test]
    fn accepts_complete_body() {
        let todo = create(json!({
            "title": "Write tests",
            "status": "pending",
            "priority": "medium",
            "description": "Unit tests for auth module"
        }))
        .unwrap();
        assert_eq!(todo.title, "Write tests");
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(todo.priority, TodoPriority::Medium);
        assert_eq!(todo.description.as_deref(), Some("Unit tests for auth module"));
    }

    #[test]
    fn update_distinguishes_null_from_absent_description() {
        let changes = update(json!({"status": "completed"})).unwrap();
        assert_eq!(changes.status, Some(TodoStatus::Completed));
        assert_eq!(changes.description, None);

        let changes = update(json!({"description": null})).unwrap();
        assert_eq!(changes.description, Some(None));

        let changes = update(json!({"description": "new"})).unwrap();
        assert_eq!(changes.description, Some(Some("new".into())));
    }

    #[test]
    fn update_revalidates_fields() {
        for body in [
            json!({"status": "inProgress"}),
            json!({"priority": "none"}),
            json!({"title": ""}),
        ] {
            assert!(matches!(update(body), Err(AppError::BadRequest(_))));
        }
    }
}
