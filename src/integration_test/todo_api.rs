use super::test_util::{app, prepare_db_and_test, send_expecting};
use crate::api::test_util::ErrorBody;
use crate::dto;
use axum::Router;
use axum::http::{Method, StatusCode};
use serde_json::json;

async fn create_user(router: &Router, email: &str) -> i32 {
    let user: dto::User = send_expecting(
        router,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": "Todo Owner", "email": email })),
        StatusCode::CREATED,
    )
    .await;

    user.id
}

async fn create_todo(router: &Router, user_id: i32, body: serde_json::Value) -> dto::Todo {
    send_expecting(
        router,
        Method::POST,
        &format!("/api/v1/users/{user_id}/todos"),
        Some(body),
        StatusCode::CREATED,
    )
    .await
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn todo_lifecycle() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        let user_id = create_user(&router, "pancho@example.com").await;

        let created = create_todo(
            &router,
            user_id,
            json!({ "title": "Buy milk", "description": "2 liters" }),
        )
        .await;
        assert_eq!(user_id, created.user_id);
        assert!(!created.done);
        assert_eq!(created.created_at, created.updated_at);

        let todo_uri = format!("/api/v1/users/{user_id}/todos/{}", created.id);
        let finished: dto::Todo = send_expecting(
            &router,
            Method::PUT,
            &todo_uri,
            Some(json!({ "done": true })),
            StatusCode::OK,
        )
        .await;
        assert!(finished.done);
        assert_eq!(Some("2 liters".to_owned()), finished.description);

        let reopened: dto::Todo = send_expecting(
            &router,
            Method::PUT,
            &todo_uri,
            Some(json!({ "done": false, "description": null })),
            StatusCode::OK,
        )
        .await;
        assert!(!reopened.done);
        assert_eq!(None, reopened.description);
        assert_eq!("Buy milk", reopened.title);

        let user: dto::User = send_expecting(
            &router,
            Method::GET,
            &format!("/api/v1/users/{user_id}"),
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(vec![reopened], user.todos);

        let confirmation: dto::DeleteConfirmation =
            send_expecting(&router, Method::DELETE, &todo_uri, None, StatusCode::OK).await;
        assert_eq!("Todo deleted successfully", confirmation.detail);

        let body: ErrorBody =
            send_expecting(&router, Method::GET, &todo_uri, None, StatusCode::NOT_FOUND).await;
        assert_eq!("Todo not found", body.error_description);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn todos_are_scoped_to_their_owner() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        let owner = create_user(&router, "owner@example.com").await;
        let stranger = create_user(&router, "stranger@example.com").await;
        let todo = create_todo(&router, owner, json!({ "title": "Private" })).await;

        let foreign_uri = format!("/api/v1/users/{stranger}/todos/{}", todo.id);
        for method in [Method::GET, Method::DELETE] {
            let body: ErrorBody =
                send_expecting(&router, method, &foreign_uri, None, StatusCode::NOT_FOUND).await;
            assert_eq!("not_found", body.error_code);
        }
        let _: ErrorBody = send_expecting(
            &router,
            Method::PUT,
            &foreign_uri,
            Some(json!({ "title": "Hijacked" })),
            StatusCode::NOT_FOUND,
        )
        .await;

        let owner_todos: Vec<dto::Todo> = send_expecting(
            &router,
            Method::GET,
            &format!("/api/v1/users/{owner}/todos"),
            None,
            StatusCode::OK,
        )
        .await;
        assert!(matches!(owner_todos.as_slice(), [dto::Todo { title, .. }] if title == "Private"));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn creating_todo_for_missing_user_fails() {
    prepare_db_and_test(|db| async move {
        let router = app(db);

        let body: ErrorBody = send_expecting(
            &router,
            Method::POST,
            "/api/v1/users/424242/todos",
            Some(json!({ "title": "Orphan" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!("bad_request", body.error_code);
        assert!(body.error_description.starts_with("Error creating todo: "));
    });
}
