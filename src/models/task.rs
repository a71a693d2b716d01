use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Transitions are unconstrained: any status may replace any other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Work is finished and waiting for review.
    Review,
    /// Task is completed.
    Done,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Input for creating a task. Unspecified status and priority take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 200 characters and not only whitespace.
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub assigned_to: Option<Uuid>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// A partial update. Every mutable field of [`Task`] is listed here; fields left as
/// `None` are not touched. For nullable columns the inner `Option` carries the new
/// value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "present")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// The user who created the task.
    pub owner_id: Uuid,
    /// The user expected to act on the task, if any.
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional narrowing applied to a task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Validated 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

/// One page of a task listing plus the number of matching tasks across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Query string accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl Task {
    /// Builds a task owned by `owner_id`, filling in defaults for unspecified fields.
    pub fn new(input: NewTask, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            owner_id,
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// A task is visible to its owner and to its assignee, and to nobody else.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.assigned_to == Some(user_id)
    }

    pub fn matches(&self, filter: &TaskFilter) -> bool {
        filter.status.map_or(true, |s| s == self.status)
            && filter.priority.map_or(true, |p| p == self.priority)
    }
}

impl TaskPatch {
    /// Writes the supplied fields into `task` and stamps `updated_at`.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = now;
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::InvalidInput("page must be at least 1".into()));
        }
        if limit < 1 {
            return Err(AppError::InvalidInput("limit must be at least 1".into()));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows skipped before this page. Saturates instead of overflowing for
    /// absurd page numbers, which simply yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl TaskQuery {
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.status,
            priority: self.priority,
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_task(owner: Uuid) -> Task {
        Task::new(
            NewTask {
                title: "Write report".to_string(),
                description: Some("quarterly".to_string()),
                ..Default::default()
            },
            owner,
        )
    }

    #[test]
    fn test_task_creation_defaults() {
        let owner = Uuid::new_v4();
        let task = sample_task(owner);

        assert_eq!(task.title, "Write report");
        assert_eq!(task.owner_id, owner);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assigned_to.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_visibility_rule() {
        let owner = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let mut task = sample_task(owner);
        assert!(task.is_visible_to(owner));
        assert!(!task.is_visible_to(assignee));

        task.assigned_to = Some(assignee);
        assert!(task.is_visible_to(assignee));
        assert!(!task.is_visible_to(stranger));
    }

    #[test]
    fn test_new_task_validation() {
        let valid = NewTask {
            title: "Valid".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let too_long = "a".repeat(201);
        for title in ["", "   ", too_long.as_str()] {
            let invalid = NewTask {
                title: title.to_string(),
                ..Default::default()
            };
            assert!(invalid.validate().is_err(), "title {:?} should be rejected", title);
        }

        let long_description = NewTask {
            title: "Valid".to_string(),
            description: Some("b".repeat(1001)),
            ..Default::default()
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("IN_PROGRESS"));
        assert_eq!(serde_json::to_value(TaskPriority::Medium).unwrap(), json!("MEDIUM"));
        let status: TaskStatus = serde_json::from_value(json!("DONE")).unwrap();
        assert_eq!(status, TaskStatus::Done);
        assert!(serde_json::from_value::<TaskStatus>(json!("done")).is_err());
    }

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let patch: TaskPatch = serde_json::from_value(json!({ "status": "DONE" })).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Done));
        assert_eq!(patch.description, None);
        assert_eq!(patch.assigned_to, None);

        let patch: TaskPatch =
            serde_json::from_value(json!({ "description": null, "assigned_to": null })).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.assigned_to, Some(None));
    }

    #[test]
    fn test_patch_apply_touches_only_supplied_fields() {
        let owner = Uuid::new_v4();
        let mut task = sample_task(owner);
        let before = task.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);

        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        patch.apply(&mut task, later);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.created_at, before.created_at);
        assert_eq!(task.updated_at, later);

        let clear = TaskPatch {
            description: Some(None),
            ..Default::default()
        };
        clear.apply(&mut task, later);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_patch_validation() {
        let blank_title = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());

        let empty = TaskPatch::default();
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
        assert!(Pagination::new(-3, 10).is_err());

        let pagination = Pagination::new(3, 10).unwrap();
        assert_eq!(pagination.offset(), 20);
        assert_eq!(Pagination::new(i64::MAX, 10).unwrap().offset(), i64::MAX);
    }

    #[test]
    fn test_filter_matching() {
        let task = sample_task(Uuid::new_v4());
        assert!(task.matches(&TaskFilter::default()));
        assert!(task.matches(&TaskFilter {
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Medium),
        }));
        assert!(!task.matches(&TaskFilter {
            status: Some(TaskStatus::Done),
            priority: None,
        }));
    }

    #[test]
    fn test_task_query_from_query_string() {
        let query = actix_web::web::Query::<TaskQuery>::from_query("status=IN_PROGRESS&page=2")
            .unwrap()
            .into_inner();
        assert_eq!(query.page(), 2);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(
            query.filter(),
            TaskFilter {
                status: Some(TaskStatus::InProgress),
                priority: None,
            }
        );

        let empty = actix_web::web::Query::<TaskQuery>::from_query("")
            .unwrap()
            .into_inner();
        assert_eq!(empty.page(), DEFAULT_PAGE);
        assert_eq!(empty.filter(), TaskFilter::default());
    }
}
