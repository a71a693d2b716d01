pub mod task;
pub mod user;

pub use task::{
    NewTask, Pagination, Task, TaskFilter, TaskPage, TaskPatch, TaskPriority, TaskQuery,
    TaskStatus,
};
pub use user::{NewUser, User, UserProfile};
