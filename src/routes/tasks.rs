use crate::{
    auth::Identity,
    error::AppError,
    models::{NewTask, TaskPatch, TaskQuery},
    tasks::TaskService,
};
use actix_web::{delete, get, post, route, web, HttpResponse, Responder};
use uuid::Uuid;

/// Response header carrying the number of matching tasks across all pages.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Lists the tasks the caller owns or is assigned to.
///
/// Tasks are ordered by creation date, newest first.
///
/// ## Query Parameters:
/// - `page` (optional, default 1): 1-based page number.
/// - `limit` (optional, default 10): page size.
/// - `status` (optional): e.g. `TODO`, `IN_PROGRESS`, `DONE`.
/// - `priority` (optional): `LOW`, `MEDIUM` or `HIGH`.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks; `X-Total-Count` holds the total match count.
///   A page past the end is an empty array.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `422 Unprocessable Entity`: `page` or `limit` below 1.
#[get("")]
pub async fn list_tasks(
    service: web::Data<TaskService>,
    identity: Identity,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let page = service
        .list(identity, query.page(), query.limit(), query.filter())
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, page.total.to_string()))
        .json(page.items))
}

/// Creates a task owned by the caller.
///
/// ## Request Body:
/// - `title`: required, non-empty.
/// - `description`, `assigned_to`, `status`, `priority`, `due_date`: optional.
///   Status defaults to `TODO`, priority to `MEDIUM`.
///
/// ## Responses:
/// - `201 Created`: The created task.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `422 Unprocessable Entity`: Empty title, or `assigned_to` is not a known user.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    identity: Identity,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let task = service.create(identity, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task.
///
/// ## Responses:
/// - `200 OK`: The task.
/// - `404 Not Found`: No such task, or the caller neither owns nor is assigned to it.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = service.get(identity, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Only the fields present in the body change. `description`, `due_date` and
/// `assigned_to` may be set to `null` to clear them.
///
/// ## Responses:
/// - `200 OK`: The updated task.
/// - `404 Not Found`: No such task, or the caller neither owns nor is assigned to it.
/// - `422 Unprocessable Entity`: Invalid field values.
#[route("/{id}", method = "PUT", method = "PATCH")]
pub async fn update_task(
    service: web::Data<TaskService>,
    identity: Identity,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let task = service
        .update(identity, task_id.into_inner(), patch.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Permanently deletes a task.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `404 Not Found`: No such task, or the caller neither owns nor is assigned to it.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    service.delete(identity, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
