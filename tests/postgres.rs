//! Store tests against a live Postgres. Run with
//! `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.

use dotenv::dotenv;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use taskdesk::models::{
    NewTask, NewUser, Pagination, Task, TaskFilter, TaskPatch, TaskStatus, User,
};
use taskdesk::store::{PgStore, TaskStore, UserStore};
use taskdesk::AppError;

async fn connect() -> PgStore {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgStore::connect(&database_url, 2)
        .await
        .expect("Failed to connect to test DB")
}

async fn create_user(store: &PgStore) -> User {
    let email = format!("pg-{}@example.com", Uuid::new_v4());
    UserStore::insert(
        store,
        NewUser {
            email,
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .expect("Failed to insert user")
}

async fn cleanup_user(store: &PgStore, user: &User) {
    let _ = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(store.pool())
        .await;
}

fn titled(title: &str, owner: &User) -> Task {
    Task::new(
        NewTask {
            title: title.to_string(),
            ..Default::default()
        },
        owner.id,
    )
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_is_rejected() {
    let store = connect().await;
    let user = create_user(&store).await;

    let err = UserStore::insert(
        &store,
        NewUser {
            email: user.email.clone(),
            password_hash: "other".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::DuplicateIdentity(_)));

    let found = store.find_by_email(&user.email).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    cleanup_user(&store, &user).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_lifecycle_and_visibility() {
    let store = connect().await;
    let owner = create_user(&store).await;
    let assignee = create_user(&store).await;
    let outsider = create_user(&store).await;

    let mut task = titled("Ship release", &owner);
    task.assigned_to = Some(assignee.id);
    let created = TaskStore::insert(&store, task).await.unwrap();

    assert!(store.find_visible(owner.id, created.id).await.unwrap().is_some());
    assert!(store.find_visible(assignee.id, created.id).await.unwrap().is_some());
    assert!(store.find_visible(outsider.id, created.id).await.unwrap().is_none());

    let patch = TaskPatch {
        status: Some(TaskStatus::Done),
        description: Some(Some("tagged".to_string())),
        ..Default::default()
    };
    assert!(store
        .update_visible(outsider.id, created.id, &patch)
        .await
        .unwrap()
        .is_none());
    let updated = store
        .update_visible(assignee.id, created.id, &patch)
        .await
        .unwrap()
        .expect("assignee may update");
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.description.as_deref(), Some("tagged"));
    assert_eq!(updated.title, "Ship release");
    assert!(updated.updated_at >= created.updated_at);

    assert!(!store.delete_visible(outsider.id, created.id).await.unwrap());
    assert!(store.delete_visible(owner.id, created.id).await.unwrap());
    assert!(store.find_visible(owner.id, created.id).await.unwrap().is_none());

    for user in [&owner, &assignee, &outsider] {
        cleanup_user(&store, user).await;
    }
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_assignee_is_invalid_input() {
    let store = connect().await;
    let owner = create_user(&store).await;

    let mut task = titled("Orphan", &owner);
    task.assigned_to = Some(Uuid::new_v4());
    let err = TaskStore::insert(&store, task).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    cleanup_user(&store, &owner).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_pages_and_counts() {
    let store = connect().await;
    let owner = create_user(&store).await;

    for i in 0..15 {
        TaskStore::insert(&store, titled(&format!("task {}", i), &owner))
            .await
            .unwrap();
    }

    let filter = TaskFilter::default();
    let second = store
        .list_visible(owner.id, &filter, Pagination::new(2, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(second.total, 15);
    assert_eq!(second.items.len(), 5);

    let third = store
        .list_visible(owner.id, &filter, Pagination::new(3, 10).unwrap())
        .await
        .unwrap();
    assert!(third.items.is_empty());

    let done = store
        .list_visible(
            owner.id,
            &TaskFilter {
                status: Some(TaskStatus::Done),
                priority: None,
            },
            Pagination::new(1, 10).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(done.total, 0);

    // Tasks cascade with their owner.
    cleanup_user(&store, &owner).await;
}
