use crate::domain::user::driving_ports::UserPort;
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{Json, Query, UserErrorResponse, ValidationErrorResponse};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(get_users, create_user, get_user, update_user, delete_user))]
/// Defines the OpenAPI documentation for the user API
pub struct UsersApi;
/// Constant used to group user endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Users";

/// Builds a router for all the user routes
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Query(page): Query<dto::Pagination>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    get_users(page, &mut ext_cxn, &user_service).await
                },
            )
            .post(
                |State(app_state): AppState, Json(new_user): Json<dto::NewUser>| async move {
                    let user_service = domain::user::UserService {};

                    create_user(new_user, &app_state.ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/:user_id",
            get(
                |State(app_state): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    get_user(user_id, &mut ext_cxn, &user_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(user_id): Path<i32>,
                 Json(update): Json<dto::UserUpdate>| async move {
                    let user_service = domain::user::UserService {};

                    update_user(user_id, update, &app_state.ext_cxn, &user_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(user_id): Path<i32>| async move {
                    let user_service = domain::user::UserService {};

                    delete_user(user_id, &app_state.ext_cxn, &user_service).await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/users",
    tag = USER_API_GROUP,
    params(dto::Pagination),
    responses(
        (status = 200, description = "A page of users with their todos", body = Vec<dto::User>),
        (status = 400, response = dto::err_resps::BasicError400Validation),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Retrieves a page of users, ordered by when they were created
async fn get_users(
    page: dto::Pagination,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<Vec<dto::User>>, ErrorResponse> {
    info!("Requested users, skip {} limit {}", page.skip, page.limit);
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    let users = user_service
        .get_users(page.into(), &mut *ext_cxn, &user_reader, &todo_reader)
        .await
        .map_err(UserErrorResponse::from)?;

    Ok(Json(users.into_iter().map(dto::User::from).collect()))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = USER_API_GROUP,
    request_body = dto::NewUser,
    responses(
        (status = 201, description = "User successfully created", body = dto::User),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Creates a user
async fn create_user(
    new_user: dto::NewUser,
    ext_cxn: &impl Transactable,
    user_service: &impl UserPort,
) -> Result<(StatusCode, Json<dto::User>), ErrorResponse> {
    info!("Attempt to create user: {}", new_user);
    new_user.validate().map_err(ValidationErrorResponse::from)?;

    let user_writer = persistence::db_user_driven_ports::DbWriteUsers;
    let created_user = user_service
        .create_user(&new_user.into(), ext_cxn, &user_writer)
        .await
        .map_err(UserErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(created_user.into())))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(("user_id" = i32, Path, description = "The ID of the user to fetch")),
    responses(
        (status = 200, description = "The user and their todos", body = dto::User),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Retrieves a single user along with their todos
async fn get_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::User>, ErrorResponse> {
    info!("Get user {user_id}");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    let user = user_service
        .get_user(user_id, &mut *ext_cxn, &user_reader, &todo_reader)
        .await
        .map_err(UserErrorResponse::from)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(("user_id" = i32, Path, description = "The ID of the user to update")),
    request_body = dto::UserUpdate,
    responses(
        (status = 200, description = "The updated user", body = dto::User),
        (status = 400, response = dto::err_resps::BasicError400),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Changes the fields present in the request body, leaving the rest of the user alone
async fn update_user(
    user_id: i32,
    update: dto::UserUpdate,
    ext_cxn: &impl Transactable,
    user_service: &impl UserPort,
) -> Result<Json<dto::User>, ErrorResponse> {
    info!("Updating user {user_id}");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let user_reader = persistence::db_user_driven_ports::DbReadUsers;
    let user_writer = persistence::db_user_driven_ports::DbWriteUsers;
    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

    let updated_user = user_service
        .update_user(
            user_id,
            &update.into(),
            ext_cxn,
            &user_reader,
            &user_writer,
            &todo_reader,
        )
        .await
        .map_err(UserErrorResponse::from)?;

    Ok(Json(updated_user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(("user_id" = i32, Path, description = "The ID of the user to delete")),
    responses(
        (status = 200, description = "User and their todos were deleted", body = dto::DeleteConfirmation),
        (status = 404, response = dto::err_resps::BasicError404),
        (status = 500, response = dto::err_resps::BasicError500),
    ),
)]
/// Deletes a user along with every todo they own
async fn delete_user(
    user_id: i32,
    ext_cxn: &impl Transactable,
    user_service: &impl UserPort,
) -> Result<Json<dto::DeleteConfirmation>, ErrorResponse> {
    info!("Deleting user {user_id}");
    let user_detect = persistence::db_user_driven_ports::DbDetectUser;
    let user_writer = persistence::db_user_driven_ports::DbWriteUsers;
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    user_service
        .delete_user(user_id, ext_cxn, &user_detect, &user_writer, &todo_writer)
        .await
        .map_err(UserErrorResponse::from)?;

    Ok(Json(dto::DeleteConfirmation::new("User")))
}
