use crate::domain;
use crate::routing_utils::{BasicErrorResponse, ExtraInfo, ValidationErrorSchema};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

pub mod todo;
pub mod user;

pub use todo::*;
pub use user::*;

#[derive(OpenApi)]
#[openapi(components(
    schemas(
        NewUser,
        UserUpdate,
        User,
        NewTodo,
        TodoUpdate,
        Todo,
        DeleteConfirmation,
        BasicErrorResponse,
        ExtraInfo,
        ValidationErrorSchema,
    ),
    responses(
        err_resps::BasicError400Validation,
        err_resps::BasicError400,
        err_resps::BasicError404,
        err_resps::BasicError500,
    )
))]
/// Captures OpenAPI schemas and canned responses defined in the DTO module
pub struct OpenApiSchemas;

/// Contains canned OpenAPI responses for the error cases handlers share
pub mod err_resps {
    use crate::routing_utils::BasicErrorResponse;
    use utoipa::ToResponse;

    #[derive(ToResponse)]
    #[response(
        description = "Submitted data failed validation or was not valid JSON",
        example = json!({
            "error_code": "invalid_input",
            "error_description": "Submitted data was invalid.",
            "extra_info": {
                "title": [
                    {
                        "code": "length",
                        "message": null,
                        "params": { "value": "", "min": 1, "max": 100 }
                    }
                ]
            }
        })
    )]
    pub struct BasicError400Validation(BasicErrorResponse);

    #[derive(ToResponse)]
    #[response(
        description = "The entity could not be created or updated",
        example = json!({
            "error_code": "bad_request",
            "error_description": "Error creating user: Inserting new user: duplicate key value violates unique constraint \"users_email_key\"",
            "extra_info": null
        })
    )]
    pub struct BasicError400(BasicErrorResponse);

    #[derive(ToResponse)]
    #[response(
        description = "The requested entity does not exist",
        example = json!({
            "error_code": "not_found",
            "error_description": "User not found",
            "extra_info": null
        })
    )]
    pub struct BasicError404(BasicErrorResponse);

    #[derive(ToResponse)]
    #[response(
        description = "Something unexpected went wrong inside the server",
        example = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )]
    pub struct BasicError500(BasicErrorResponse);
}

/// Offset/limit query parameters for list endpoints
#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Number of records to skip
    #[serde(default)]
    #[param(example = 0)]
    pub skip: u32,
    /// Maximum number of records to return
    #[serde(default = "default_page_limit")]
    #[param(example = 10)]
    pub limit: u32,
}

fn default_page_limit() -> u32 {
    domain::user::PageRequest::default().limit as u32
}

impl From<Pagination> for domain::user::PageRequest {
    fn from(value: Pagination) -> Self {
        domain::user::PageRequest {
            skip: i64::from(value.skip),
            limit: i64::from(value.limit),
        }
    }
}

/// Acknowledges that an entity was removed
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct DeleteConfirmation {
    #[schema(example = "Todo deleted successfully")]
    pub detail: String,
}

impl DeleteConfirmation {
    pub fn new(entity: &str) -> Self {
        DeleteConfirmation {
            detail: format!("{entity} deleted successfully"),
        }
    }
}
