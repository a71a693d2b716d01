use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Pagination, Task, TaskFilter, TaskPage, TaskPatch, User};
use crate::store::{TaskStore, UserStore};

/// In-process store enforcing the same constraints as the Postgres schema.
///
/// One mutex guards users and tasks together, so each call is atomic with respect to
/// every other call. Used by the test-suite and for running without a database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Insertion order; listing relies on it to break `created_at` ties.
    tasks: Vec<Task>,
}

impl State {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.contains_key(&id)
    }

    fn visible_index(&self, caller: Uuid, task_id: Uuid) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id && t.is_visible_to(caller))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

fn unknown_user() -> AppError {
    AppError::InvalidInput("Referenced user does not exist".into())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateIdentity("Email already registered".into()));
        }
        let user = User::new(user);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.lock()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock()?.users.len() as i64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let mut state = self.lock()?;
        if !state.user_exists(task.owner_id) {
            return Err(unknown_user());
        }
        if let Some(assignee) = task.assigned_to {
            if !state.user_exists(assignee) {
                return Err(unknown_user());
            }
        }
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_visible(&self, caller: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError> {
        let state = self.lock()?;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.is_visible_to(caller))
            .cloned())
    }

    async fn list_visible(
        &self,
        caller: Uuid,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> Result<TaskPage, AppError> {
        let state = self.lock()?;
        // Newest inserted first, then a stable sort keeps that order among equal timestamps.
        let mut matching: Vec<&Task> = state
            .tasks
            .iter()
            .rev()
            .filter(|t| t.is_visible_to(caller) && t.matches(filter))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

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
        let mut state = self.lock()?;
        // Hidden tasks report `None` before the patch itself is checked.
        let Some(index) = state.visible_index(caller, task_id) else {
            return Ok(None);
        };
        if let Some(Some(assignee)) = patch.assigned_to {
            if !state.user_exists(assignee) {
                return Err(unknown_user());
            }
        }
        let task = &mut state.tasks[index];
        patch.apply(task, Utc::now());
        Ok(Some(task.clone()))
    }

    async fn delete_visible(&self, caller: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|t| !(t.id == task_id && t.is_visible_to(caller)));
        Ok(state.tasks.len() != before)
    }
}
