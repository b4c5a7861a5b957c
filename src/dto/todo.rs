use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for creating a new todo via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[schema(example = "Milk, eggs and bread")]
    pub description: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl From<NewTodo> for domain::todo::CreateTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::CreateTodo {
            title: value.title,
            description: value.description,
            done: value.done,
        }
    }
}

/// DTO for a returned todo on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct Todo {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = 4)]
    pub user_id: i32,
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[schema(example = "Milk, eggs and bread")]
    pub description: Option<String>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            user_id: value.owner_user_id,
            title: value.title,
            description: value.description,
            done: value.done,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for updating a todo. Omitted fields are left alone; `description` may be set to null
/// to clear it.
#[derive(Debug, Deserialize, Validate, ToSchema, Default)]
#[cfg_attr(test, derive(Serialize))]
pub struct TodoUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Buy groceries")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[cfg_attr(test, serde(skip_serializing_if = "Option::is_none"))]
    #[schema(value_type = Option<String>, example = json!(null))]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[schema(example = true)]
    pub done: Option<bool>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing field (`None`, via `default`)
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<TodoUpdate> for domain::todo::UpdateTodo {
    fn from(value: TodoUpdate) -> Self {
        domain::todo::UpdateTodo {
            title: value.title.into(),
            description: value.description.into(),
            done: value.done.into(),
        }
    }
}
