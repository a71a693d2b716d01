//! bcrypt hashing. The async variants move the work onto tokio's blocking pool so request
//! workers keep serving while a hash is computed.

use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashed once per process and compared against when a login names an unknown email.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "placeholder-for-unknown-accounts";

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// bcrypt re-derives the hash from the stored salt and compares the digests in
/// constant time.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// A valid hash at `cost` that no real account uses.
pub fn unknown_account_hash(cost: u32) -> Result<String, AppError> {
    hash_password(UNKNOWN_ACCOUNT_PASSWORD, cost)
}

async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("password worker failed: {}", e)))?
}

pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    run_blocking(move || hash_password(&password, cost)).await
}

pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    run_blocking(move || verify_password(&password, &hashed_password)).await
}
