//! Persistence seam between the services and the relational store.
//!
//! Every mutating method runs as a single transaction in the backing store: either all of
//! its writes (timestamps included) become visible, or none do. Uniqueness of
//! `users.email` and validity of task user references are enforced here and surfaced as
//! [`AppError::DuplicateIdentity`] and [`AppError::InvalidInput`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Pagination, Task, TaskFilter, TaskPage, TaskPatch, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Exact, case-sensitive match on the stored email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}

/// Task persistence. Every read and write except `insert` is scoped to the tasks the
/// caller owns or is assigned to; tasks outside that set behave as if they did not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a fully built task. Fails with `InvalidInput` if the owner or the
    /// assignee does not reference an existing user.
    async fn insert(&self, task: Task) -> Result<Task, AppError>;

    async fn find_visible(&self, caller: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError>;

    /// Visible tasks matching `filter`, newest first.
    async fn list_visible(
        &self,
        caller: Uuid,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> Result<TaskPage, AppError>;

    /// Applies `patch` to a visible task and returns the stored result, or `None` when no
    /// such task is visible to `caller`.
    async fn update_visible(
        &self,
        caller: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Returns `false` when no such task is visible to `caller`.
    async fn delete_visible(&self, caller: Uuid, task_id: Uuid) -> Result<bool, AppError>;
}
