#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::{json, Value};

use taskdesk::auth::TokenKeys;
use taskdesk::routes;
use taskdesk::store::MemoryStore;
use taskdesk::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
/// Lowest cost bcrypt accepts; keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_keys() -> TokenKeys {
    TokenKeys::new(TEST_SECRET, Duration::hours(1))
}

/// Application state backed by a fresh in-memory store.
pub fn memory_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::from_parts(store.clone(), store, test_keys(), TEST_BCRYPT_COST)
        .expect("failed to build test state")
}

/// Builds the same app the binary serves, minus CORS.
pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| state.register(cfg))
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

/// Sends a request and returns the status plus the body parsed as JSON (`null` when empty
/// or not JSON).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn register<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// A registered user with a valid token.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, email, password).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    let (status, body) = login(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    TestUser {
        id: body["user_id"].as_str().expect("user_id").to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub fn authorized(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn create_task<S, B>(app: &S, token: &str, payload: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = authorized(test::TestRequest::post().uri("/api/tasks"), token)
        .set_json(payload)
        .to_request();
    send(app, req).await
}

pub async fn list_tasks<S, B>(app: &S, token: &str, query: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let uri = if query.is_empty() {
        "/api/tasks".to_string()
    } else {
        format!("/api/tasks?{}", query)
    };
    let req = authorized(test::TestRequest::get().uri(&uri), token).to_request();
    send(app, req).await
}
