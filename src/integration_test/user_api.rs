use super::test_util::{app, prepare_db_and_test, send, send_expecting};
use crate::api::test_util::ErrorBody;
use crate::dto;
use axum::http::{Method, StatusCode};
use serde_json::json;

async fn create_pancho(router: &axum::Router) -> dto::User {
    send_expecting(
        router,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": "Pancho", "email": "p@example.com" })),
        StatusCode::CREATED,
    )
    .await
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn can_create_user() {
    prepare_db_and_test(|db| async move {
        let router = app(db);

        let created = create_pancho(&router).await;

        assert_eq!("Pancho", created.name);
        assert_eq!("p@example.com", created.email);
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.todos.is_empty());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn duplicate_email_is_rejected() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        create_pancho(&router).await;

        let body: ErrorBody = send_expecting(
            &router,
            Method::POST,
            "/api/v1/users",
            Some(json!({ "name": "Other Pancho", "email": "p@example.com" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!("bad_request", body.error_code);

        let users: Vec<dto::User> =
            send_expecting(&router, Method::GET, "/api/v1/users", None, StatusCode::OK).await;
        assert_eq!(1, users.len());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn users_are_paginated_in_creation_order() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        for index in 0..3 {
            send(
                &router,
                Method::POST,
                "/api/v1/users",
                Some(json!({ "name": format!("User {index}"), "email": format!("u{index}@example.com") })),
            )
            .await;
        }

        let page: Vec<dto::User> = send_expecting(
            &router,
            Method::GET,
            "/api/v1/users?skip=1&limit=1",
            None,
            StatusCode::OK,
        )
        .await;

        assert!(matches!(page.as_slice(), [dto::User { name, .. }] if name == "User 1"));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn partial_update_keeps_other_fields() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        let created = create_pancho(&router).await;

        let updated: dto::User = send_expecting(
            &router,
            Method::PUT,
            &format!("/api/v1/users/{}", created.id),
            Some(json!({ "name": "Francisco" })),
            StatusCode::OK,
        )
        .await;

        assert_eq!("Francisco", updated.name);
        assert_eq!("p@example.com", updated.email);
        assert_eq!(created.created_at, updated.created_at);
        assert!(updated.updated_at >= created.updated_at);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn missing_user_is_404() {
    prepare_db_and_test(|db| async move {
        let router = app(db);

        for method in [Method::GET, Method::DELETE] {
            let body: ErrorBody =
                send_expecting(&router, method, "/api/v1/users/999", None, StatusCode::NOT_FOUND)
                    .await;
            assert_eq!("User not found", body.error_description);
        }

        let body: ErrorBody = send_expecting(
            &router,
            Method::PUT,
            "/api/v1/users/999",
            Some(json!({ "name": "Nobody" })),
            StatusCode::NOT_FOUND,
        )
        .await;
        assert_eq!("not_found", body.error_code);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleting_user_removes_their_todos() {
    prepare_db_and_test(|db| async move {
        let router = app(db);
        let created = create_pancho(&router).await;
        let todos_uri = format!("/api/v1/users/{}/todos", created.id);
        send(&router, Method::POST, &todos_uri, Some(json!({ "title": "Buy milk" }))).await;

        let confirmation: dto::DeleteConfirmation = send_expecting(
            &router,
            Method::DELETE,
            &format!("/api/v1/users/{}", created.id),
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!("User deleted successfully", confirmation.detail);

        let todos: Vec<dto::Todo> =
            send_expecting(&router, Method::GET, &todos_uri, None, StatusCode::OK).await;
        assert!(todos.is_empty());
    });
}
