use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::Serialize;
use tracing::{error, info};
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToSchema, openapi};
use validator::ValidationErrors;

use crate::domain::todo::driving_ports::TodoError;
use crate::domain::user::driving_ports::UserError;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
pub struct BasicErrorResponse {
    #[schema(example = "not_found")]
    pub error_code: String,
    #[schema(example = "User not found")]
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

impl BasicErrorResponse {
    fn with_status(self, status: StatusCode) -> Response {
        (status, axum::Json(self)).into_response()
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type for failures nobody can act on besides the server operator
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Internal failure: {:#}", self.0);

        BasicErrorResponse {
            error_code: "internal_error".into(),
            error_description: "Could not access data to complete your request".into(),
            extra_info: None,
        }
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn not_found(description: String) -> Response {
    info!("{description}");

    BasicErrorResponse {
        error_code: "not_found".into(),
        error_description: description,
        extra_info: None,
    }
    .with_status(StatusCode::NOT_FOUND)
}

fn bad_request(description: String) -> Response {
    error!("{description}");

    BasicErrorResponse {
        error_code: "bad_request".into(),
        error_description: description,
        extra_info: None,
    }
    .with_status(StatusCode::BAD_REQUEST)
}

/// Response type that turns user service failures into [BasicErrorResponse]s
pub struct UserErrorResponse(UserError);

impl From<UserError> for UserErrorResponse {
    fn from(value: UserError) -> Self {
        Self(value)
    }
}

impl IntoResponse for UserErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            err @ UserError::NotFound => not_found(err.to_string()),
            err @ (UserError::CreateFailure(_) | UserError::UpdateFailure(_)) => {
                bad_request(err.to_string())
            }
            UserError::PortError(cause) => GenericErrorResponse(cause).into_response(),
        }
    }
}

/// Response type that turns todo service failures into [BasicErrorResponse]s
pub struct TodoErrorResponse(TodoError);

impl From<TodoError> for TodoErrorResponse {
    fn from(value: TodoError) -> Self {
        Self(value)
    }
}

impl IntoResponse for TodoErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            err @ TodoError::NotFound => not_found(err.to_string()),
            err @ (TodoError::CreateFailure(_) | TodoError::UpdateFailure(_)) => {
                bad_request(err.to_string())
            }
            TodoError::PortError(cause) => GenericErrorResponse(cause).into_response(),
        }
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse {
            error_code: "invalid_input".into(),
            error_description: "Submitted data was invalid.".to_owned(),
            extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
        }
        .with_status(StatusCode::BAD_REQUEST)
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse {
            error_code: "invalid_json".into(),
            error_description: "The passed request body contained malformed or unreadable JSON."
                .into(),
            extra_info: Some(ExtraInfo::Message(self.parse_problem)),
        }
        .with_status(StatusCode::BAD_REQUEST)
    }
}

/// Wrapper for [axum::extract::Query] which reports unparseable query strings the same way
/// as other invalid input
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(QueryErrorResponse))]
pub struct Query<T>(pub T);

/// Response type representing query string parse errors
pub struct QueryErrorResponse {
    parse_problem: String,
}

impl From<QueryRejection> for QueryErrorResponse {
    fn from(value: QueryRejection) -> Self {
        QueryErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for QueryErrorResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse {
            error_code: "invalid_input".into(),
            error_description: "Submitted data was invalid.".into(),
            extra_info: Some(ExtraInfo::Message(self.parse_problem)),
        }
        .with_status(StatusCode::BAD_REQUEST)
    }
}
