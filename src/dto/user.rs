use crate::domain;
use crate::dto::todo::Todo;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a user, along with every todo they own
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct User {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub todos: Vec<Todo>,
}

impl From<domain::user::UserWithTodos> for User {
    fn from(value: domain::user::UserWithTodos) -> Self {
        let domain::user::UserWithTodos { user, todos } = value;

        User {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            todos: todos.into_iter().map(Todo::from).collect(),
        }
    }
}

/// DTO for creating a new user via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{name} <{email}>")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "John Doe")]
    pub name: String,
    #[validate(email, length(max = 100))]
    #[schema(example = "john@example.com")]
    pub email: String,
}

impl From<NewUser> for domain::user::CreateUser {
    fn from(value: NewUser) -> Self {
        domain::user::CreateUser {
            name: value.name,
            email: value.email,
        }
    }
}

/// DTO for changing a user's details. Omitted (or null) fields are left as they are.
#[derive(Deserialize, Validate, ToSchema, Default)]
#[cfg_attr(test, derive(Serialize))]
pub struct UserUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(email, length(max = 100))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
}

impl From<UserUpdate> for domain::user::UpdateUser {
    fn from(value: UserUpdate) -> Self {
        domain::user::UpdateUser {
            name: value.name.into(),
            email: value.email.into(),
        }
    }
}
