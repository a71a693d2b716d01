//! Task access control and queries.
//!
//! Every operation takes the caller's [`Identity`]. A caller may read, update or delete a
//! task only if they own it or are assigned to it; any other task is reported as
//! `NotFound`, exactly like a task that does not exist.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{NewTask, Pagination, Task, TaskFilter, TaskPage, TaskPatch};
use crate::store::TaskStore;

pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates a task owned by the caller. Status defaults to `TODO` and priority to
    /// `MEDIUM`.
    pub async fn create(&self, caller: Identity, input: NewTask) -> Result<Task, AppError> {
        input.validate()?;
        let task = self.tasks.insert(Task::new(input, caller.user_id())).await?;
        log::info!("user {} created task {}", caller.user_id(), task.id);
        Ok(task)
    }

    pub async fn get(&self, caller: Identity, task_id: Uuid) -> Result<Task, AppError> {
        self.tasks
            .find_visible(caller.user_id(), task_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Tasks the caller owns or is assigned to, newest first. A page past the end is
    /// empty rather than an error.
    pub async fn list(
        &self,
        caller: Identity,
        page: i64,
        limit: i64,
        filter: TaskFilter,
    ) -> Result<TaskPage, AppError> {
        let pagination = Pagination::new(page, limit)?;
        self.tasks
            .list_visible(caller.user_id(), &filter, pagination)
            .await
    }

    /// Applies only the fields present in `patch` and refreshes `updated_at`.
    pub async fn update(
        &self,
        caller: Identity,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        patch.validate()?;
        let task = self
            .tasks
            .update_visible(caller.user_id(), task_id, &patch)
            .await?
            .ok_or_else(not_found)?;
        log::info!("user {} updated task {}", caller.user_id(), task.id);
        Ok(task)
    }

    pub async fn delete(&self, caller: Identity, task_id: Uuid) -> Result<(), AppError> {
        if !self.tasks.delete_visible(caller.user_id(), task_id).await? {
            return Err(not_found());
        }
        log::info!("user {} deleted task {}", caller.user_id(), task_id);
        Ok(())
    }
}
