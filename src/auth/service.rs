use std::sync::Arc;

use validator::Validate;

use crate::auth::password::{
    hash_password_blocking, unknown_account_hash, verify_password_blocking,
};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest, TokenKeys};
use crate::error::AppError;
use crate::models::{NewUser, UserProfile};
use crate::store::UserStore;

/// Registers accounts and exchanges credentials for signed tokens.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
    bcrypt_cost: u32,
    /// Verified against when the email is unknown, so both failure paths of
    /// `authenticate` do the same bcrypt work.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        keys: TokenKeys,
        bcrypt_cost: u32,
    ) -> Result<Self, AppError> {
        let dummy_hash = unknown_account_hash(bcrypt_cost)?;
        Ok(Self {
            users,
            keys,
            bcrypt_cost,
            dummy_hash,
        })
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Creates an account and returns its public profile.
    ///
    /// Fails with `InvalidInput` for a malformed email or empty password and with
    /// `DuplicateIdentity` when the email is already registered. Nothing is stored on
    /// any failure path.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AppError> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateIdentity("Email already registered".into()));
        }

        let password_hash = hash_password_blocking(request.password, self.bcrypt_cost).await?;

        // The unique constraint still guards against a concurrent registration.
        let user = self
            .users
            .insert(NewUser {
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("registered user {}", user.id);
        Ok(user.into())
    }

    /// Checks the credentials and issues a token for the matching user.
    ///
    /// An unknown email and a wrong password both yield `InvalidCredentials`.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = self.users.find_by_email(&request.email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let password_matches = verify_password_blocking(request.password, stored_hash).await?;

        match user {
            Some(user) if password_matches => {
                let token = self.keys.issue(user.id)?;
                log::info!("user {} logged in", user.id);
                Ok(AuthResponse {
                    token,
                    user_id: user.id,
                    expires_in: self.keys.ttl().num_seconds(),
                })
            }
            _ => {
                log::info!("rejected login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}
