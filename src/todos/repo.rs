use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::todos::repo_types::{NewTodo, Todo, TodoChanges, TodoFilter};

#[async_trait]
pub trait TodoRepo: Send + Sync {
    async fn list(&self, filter: TodoFilter) -> anyhow::Result<Vec<Todo>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>>;
    async fn create(&self, todo: NewTodo) -> anyhow::Result<Todo>;
    /// Returns `None` when no row has this id.
    async fn update(&self, id: Uuid, changes: TodoChanges) -> anyhow::Result<Option<Todo>>;
    /// Returns `false` when no row has this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTodoRepo {
    db: PgPool,
}

impl PgTodoRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoRepo for PgTodoRepo {
    async fn list(&self, filter: TodoFilter) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, status, priority, description, created_at
            FROM todos
            WHERE ($1::todo_status IS NULL OR status = $1)
              AND ($2::todo_priority IS NULL OR priority = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(filter.status)
        .bind(filter.priority)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, status, priority, description, created_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, todo: NewTodo) -> anyhow::Result<Todo> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, status, priority, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, status, priority, description, created_at
            "#,
        )
        .bind(todo.title)
        .bind(todo.status)
        .bind(todo.priority)
        .bind(todo.description)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: TodoChanges) -> anyhow::Result<Option<Todo>> {
        let touch_description = changes.description.is_some();
        let row = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
               SET title = COALESCE($2, title),
                   status = COALESCE($3, status),
                   priority = COALESCE($4, priority),
                   description = CASE WHEN $5 THEN $6 ELSE description END
             WHERE id = $1
            RETURNING id, title, status, priority, description, created_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(touch_description)
        .bind(changes.description.flatten())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use time::OffsetDateTime;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryTodoRepo {
        rows: RwLock<Vec<Todo>>,
    }

    impl MemoryTodoRepo {
        pub async fn len(&self) -> usize {
            self.rows.read().await.len()
        }
    }

    #[async_trait]
    impl TodoRepo for MemoryTodoRepo {
        async fn list(&self, filter: TodoFilter) -> anyhow::Result<Vec<Todo>> {
            let rows = self.rows.read().await;
            Ok(rows.iter().filter(|t| filter.matches(t)).cloned().collect())
        }

        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
            Ok(self.rows.read().await.iter().find(|t| t.id == id).cloned())
        }

        async fn create(&self, todo: NewTodo) -> anyhow::Result<Todo> {
            let row = Todo {
                id: Uuid::new_v4(),
                title: todo.title,
                status: todo.status,
                priority: todo.priority,
                description: todo.description,
                created_at: OffsetDateTime::now_utc(),
            };
            self.rows.write().await.push(row.clone());
            Ok(row)
        }

        async fn update(&self, id: Uuid, changes: TodoChanges) -> anyhow::Result<Option<Todo>> {
            let mut rows = self.rows.write().await;
            let Some(row) = rows.iter_mut().find(|t| t.id == id) else {
                return Ok(None);
            };
            changes.apply(row);
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
            let mut rows = self.rows.write().await;
            let before = rows.len();
            rows.retain(|t| t.id != id);
            Ok(rows.len() < before)
        }
    }
}
