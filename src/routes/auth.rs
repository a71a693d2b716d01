use crate::{
    auth::{AuthService, LoginRequest, RegisterRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates an account and returns its public profile. The password hash is never
/// part of the response.
///
/// ## Responses:
/// - `201 Created`: `{"id", "email", "created_at"}`.
/// - `400 Bad Request`: The body is not valid JSON or misses a field.
/// - `409 Conflict`: The email is already registered.
/// - `422 Unprocessable Entity`: Malformed email or empty password.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let profile = auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// Login user
///
/// Exchanges email and password for a bearer token.
///
/// ## Responses:
/// - `200 OK`: `{"token", "user_id", "expires_in"}`.
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable).
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth.authenticate(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
