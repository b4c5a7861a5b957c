use crate::domain;
use crate::domain::todo::{CreateTodo, Todo};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};

const TODO_COLUMNS: &str = "id, user_id, title, description, done, created_at, updated_at";

#[derive(FromRow)]
struct TodoRow {
    id: i32,
    user_id: i32,
    title: String,
    description: Option<String>,
    done: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            owner_user_id: value.user_id,
            title: value.title,
            description: value.description,
            done: value.done,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn todos_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<Todo> = query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch todos for a user")?
        .into_iter()
        .map(Todo::from)
        .collect();

        Ok(todos)
    }

    async fn todos_for_users(
        &self,
        user_ids: &[i32],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<Todo> = query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ANY($1) ORDER BY id"
        ))
        .bind(user_ids)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch todos for a set of users")?
        .into_iter()
        .map(Todo::from)
        .collect();

        Ok(todos)
    }

    async fn user_todo_by_id(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo by ID")?
        .map(Todo::from);

        Ok(todo)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo_for_user(
        &self,
        user_id: i32,
        new_todo: &CreateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let created = query_as::<_, TodoRow>(&format!(
            "INSERT INTO todos(user_id, title, description, done) VALUES ($1, $2, $3, $4) \
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&new_todo.title)
        .bind(&new_todo.description)
        .bind(new_todo.done)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(created.into())
    }

    async fn update_todo(
        &self,
        todo: &Todo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let updated = query_as::<_, TodoRow>(&format!(
            "UPDATE todos SET title = $1, description = $2, done = $3, updated_at = now() \
             WHERE id = $4 AND user_id = $5 RETURNING {TODO_COLUMNS}"
        ))
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.done)
        .bind(todo.id)
        .bind(todo.owner_user_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?;

        Ok(updated.into())
    }

    async fn delete_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(todo_id)
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        Ok(())
    }

    async fn delete_todos_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("DELETE FROM todos WHERE user_id = $1")
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove every todo owned by a user")?;

        Ok(())
    }
}
