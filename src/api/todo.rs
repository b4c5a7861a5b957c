use crate::domain::todo::driving_ports::TodoPort;
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{Json, TodoErrorResponse, ValidationErrorResponse};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(
    get_todos_for_user,
    create_todo_for_user,
    get_todo_for_user,
    update_todo,
    delete_todo
))]
/// Defines the OpenAPI documentation for the todo API
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

#[derive(Deserialize)]
struct TodoPath {
    user_id: i32,
    todo_id: i32,
}

/// Adds routes for user-owned todos. Meant to be merged into the router nested under "/users".
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/:user_id/todos",
            get(
                |State(app_state): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    get_todos_for_user(user_id, &mut ext_cxn, &todo_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 Path(user_id): Path<i32>,
                 Json(new_todo): Json<dto::NewTodo>| async move {
                    let todo_service = domain::todo::TodoService {};

                    create_todo_for_user(user_id, new_todo, &app_state.ext_cxn, &todo_service)
                        .await
                },
            ),
        )
        .route(
            "/:user_id/todos/:todo_id",
            get(
                |State(app_state): AppState, Path(path): Path<TodoPath>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    get_todo_for_user(path.user_id, path.todo_id, &mut ext_cxn, &todo_service)
                        .await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(path): Path<TodoPath>,
                 Json(update): Json<dto::TodoUpdate>| async move {
                    let todo_service = domain::todo::TodoService {};

                    update_todo(
                        path.user_id,
                        path.todo_id,
                        update,
                        &app_state.ext_cxn,
                        &todo_service,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState, Path(path): Path<TodoPath>| async move {
                    let todo_service = domain::todo::TodoService {};

                    delete_todo(path.user_id, path.todo_id, &app_state.ext_cxn, &todo_service)
                        .await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/todos",
    tag = TODO_API_GROUP,
    params(("user_id" = i32, Path, description = "The user whose todos should be listed")),
    responses(
        (status = 200, description = "Every todo the user owns", body = Vec<dto::Todo>),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Retrieves every todo owned by a user
async fn get_todos_for_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<Vec<dto::Todo>>, ErrorResponse> {
    info!("Get todos for user {user_id}");
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    let todos = todo_service
        .todos_for_user(user_id, &mut *ext_cxn, &todo_reader)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    post,
    path = "/users/{user_id}/todos",
    tag = TODO_API_GROUP,
    params(("user_id" = i32, Path, description = "The user who will own the todo")),
    request_body = dto::NewTodo,
    responses(
        (status = 201, description = "Todo successfully created", body = dto::Todo),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Adds a new todo for a user
async fn create_todo_for_user(
    user_id: i32,
    new_todo: dto::NewTodo,
    ext_cxn: &impl Transactable,
    todo_service: &impl TodoPort,
) -> Result<(StatusCode, Json<dto::Todo>), ErrorResponse> {
    info!("Adding todo for user {user_id}");
    new_todo.validate().map_err(ValidationErrorResponse::from)?;

    let user_detect = persistence::db_user_driven_ports::DbDetectUser;
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    let created_todo = todo_service
        .create_todo_for_user(user_id, &new_todo.into(), ext_cxn, &user_detect, &todo_writer)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(created_todo.into())))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "The user who owns the todo"),
        ("todo_id" = i32, Path, description = "The todo to fetch"),
    ),
    responses(
        (status = 200, description = "The requested todo", body = dto::Todo),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Retrieves a specific todo owned by a user
async fn get_todo_for_user(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Get todo {todo_id} for user {user_id}");
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    let todo = todo_service
        .user_todo_by_id(user_id, todo_id, &mut *ext_cxn, &todo_reader)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todo.into()))
}

#[utoipa::path(
    put,
    path = "/users/{user_id}/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "The user who owns the todo"),
        ("todo_id" = i32, Path, description = "The todo to update"),
    ),
    request_body = dto::TodoUpdate,
    responses(
        (status = 200, description = "The updated todo", body = dto::Todo),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Changes the fields present in the request body, leaving the rest of the todo alone
async fn update_todo(
    user_id: i32,
    todo_id: i32,
    update: dto::TodoUpdate,
    ext_cxn: &impl Transactable,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Updating todo {todo_id} for user {user_id}");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    let updated_todo = todo_service
        .update_todo(
            user_id,
            todo_id,
            &update.into(),
            ext_cxn,
            &todo_reader,
            &todo_writer,
        )
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(updated_todo.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "The user who owns the todo"),
        ("todo_id" = i32, Path, description = "The todo to delete"),
    ),
    responses(
        (status = 200, description = "Todo was deleted", body = dto::DeleteConfirmation),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Deletes a todo
async fn delete_todo(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &impl Transactable,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::DeleteConfirmation>, ErrorResponse> {
    info!("Deleting todo {todo_id} for user {user_id}");
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    todo_service
        .delete_todo(user_id, todo_id, ext_cxn, &todo_reader, &todo_writer)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::DeleteConfirmation::new("Todo")))
}
