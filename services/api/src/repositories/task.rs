//! Task repository for database operations
//!
//! Every read and write is scoped to the owning user: a task that belongs to
//! someone else behaves exactly like a task that does not exist.

use anyhow::Result;
use chrono::Utc;
use common::models::{NewTask, Task, UpdateTask};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteExecutor, SqliteRow},
};
use tracing::info;
use uuid::Uuid;

/// Task repository for database operations
#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    /// Create a new task repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a task owned by `user_id`, applying model defaults
    pub async fn create(&self, user_id: Uuid, new_task: &NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new_task.title.clone(),
            status: new_task.status.unwrap_or_default(),
            due_date: new_task.due_date,
            priority: new_task.priority.unwrap_or_default(),
            user_id,
            created_at: now,
            updated_at: now,
        };

        info!("Creating task {} for user {}", task.id, user_id);

        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, status, due_date, priority, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.priority.as_str())
        .bind(task.user_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(task)
    }

    /// Get all tasks owned by `user_id`, oldest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Task>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, status, due_date, priority, user_id, created_at, updated_at
            FROM tasks
            WHERE user_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    /// Find a task by ID, if `user_id` owns it
    pub async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>> {
        fetch_owned(&self.pool, id, user_id).await
    }

    /// Merge `changes` into a task owned by `user_id`
    ///
    /// Returns `None` when the caller owns no task with that id.
    pub async fn update_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateTask,
    ) -> Result<Option<Task>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut task) = fetch_owned(&mut *tx, id, user_id).await? else {
            return Ok(None);
        };

        changes.apply_to(&mut task);
        task.updated_at = Utc::now();

        info!("Updating task {} for user {}", id, user_id);

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, status = ?, due_date = ?, priority = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&task.title)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.priority.as_str())
        .bind(task.updated_at)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;

        Ok(Some(task))
    }

    /// Delete a task owned by `user_id`
    ///
    /// Returns `false` when the caller owns no task with that id.
    pub async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        info!("Deleting task {} for user {}", id, user_id);

        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn fetch_owned<'e>(
    executor: impl SqliteExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Task>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, status, due_date, priority, user_id, created_at, updated_at
        FROM tasks
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(task_from_row).transpose()
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;

    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        status: status.parse()?,
        due_date: row.try_get("due_date")?,
        priority: priority.parse()?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
