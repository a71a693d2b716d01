use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Pagination, Task, TaskFilter, TaskPage, TaskPatch, User};
use crate::store::{TaskStore, UserStore};

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, owner_id, \
                            assigned_to, created_at, updated_at";

/// Postgres-backed store. Each call opens its own transaction from the pool; nothing is
/// shared between calls beyond the pool itself.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Appends the visibility rule and the optional filters as a WHERE clause.
fn push_visible_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    caller: Uuid,
    filter: &TaskFilter,
) {
    builder.push(" WHERE (owner_id = ");
    builder.push_bind(caller);
    builder.push(" OR assigned_to = ");
    builder.push_bind(caller);
    builder.push(")");

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ");
        builder.push_bind(priority);
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let user = User::new(user);
        let mut tx = self.pool.begin().await?;
        let stored = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;
        let stored = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.owner_id)
        .bind(task.assigned_to)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn find_visible(&self, caller: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE id = $1 AND (owner_id = $2 OR assigned_to = $2)"
        ))
        .bind(task_id)
        .bind(caller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_visible(
        &self,
        caller: Uuid,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> Result<TaskPage, AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_visible_filter(&mut count_query, caller, filter);
        let (total,) = count_query
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_visible_filter(&mut page_query, caller, filter);
        page_query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        page_query.push_bind(pagination.limit());
        page_query.push(" OFFSET ");
        page_query.push_bind(pagination.offset());
        let items = page_query
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;

        Ok(TaskPage {
            items,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
        })
    }

    async fn update_visible(
        &self,
        caller: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE id = $1 AND (owner_id = $2 OR assigned_to = $2)
             FOR UPDATE"
        ))
        .bind(task_id)
        .bind(caller)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut task) = current else {
            return Ok(None);
        };
        patch.apply(&mut task, Utc::now());

        let stored = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $2, description = $3, status = $4, priority = $5,
                 due_date = $6, assigned_to = $7, updated_at = $8
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.assigned_to)
        .bind(task.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(stored))
    }

    async fn delete_visible(&self, caller: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let result =
            sqlx::query("DELETE FROM tasks WHERE id = $1 AND (owner_id = $2 OR assigned_to = $2)")
                .bind(task_id)
                .bind(caller)
                .execute(&mut *tx)
                .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
