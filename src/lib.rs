#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "User registration and bearer-token authentication, plus task CRUD scoped to the"]
#![doc = "tasks a caller owns or is assigned to. The binary (`main.rs`) wires these pieces"]
#![doc = "into an actix-web server; the integration tests drive the same routes in process."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::error::AppError;
pub use crate::state::AppState;
