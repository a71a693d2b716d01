pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use extractors::Identity;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use token::{Claims, TokenKeys};

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be a valid email address. Stored and matched exactly as given.
    #[validate(email)]
    pub email: String,
    /// Must not be empty.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a user login request.
///
/// Not validated: malformed credentials simply fail to match an account.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed bearer token.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: Uuid,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

impl RegisterRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}
