use crate::domain;
use crate::domain::FieldUpdate;
use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::domain::user::driven_ports::DetectUser;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use chrono::{DateTime, Utc};

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: i32,
    pub owner_user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Merges the fields present in [update] over this todo
    pub fn apply_update(&mut self, update: &UpdateTodo) {
        update.title.apply_to(&mut self.title);
        update.description.apply_to(&mut self.description);
        update.done.apply_to(&mut self.done);
    }
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
}

#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateTodo {
    pub title: FieldUpdate<String>,
    pub description: FieldUpdate<Option<String>>,
    pub done: FieldUpdate<bool>,
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait TodoReader {
        async fn todos_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        /// Fetches the todos owned by any of [user_ids] in one go, ordered by todo ID
        async fn todos_for_users(
            &self,
            user_ids: &[i32],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn user_todo_by_id(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    pub trait TodoWriter {
        async fn create_todo_for_user(
            &self,
            user_id: i32,
            new_todo: &CreateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        /// Persists the editable fields of [todo] and returns the stored row with a refreshed
        /// `updated_at`
        async fn update_todo(
            &self,
            todo: &Todo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        async fn delete_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn delete_todos_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::{ExternalConnectivity, Transactable};
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("Todo not found")]
        NotFound,
        #[error("Error creating todo: {0:#}")]
        CreateFailure(anyhow::Error),
        #[error("Error updating todo: {0:#}")]
        UpdateFailure(anyhow::Error),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait TodoPort {
        async fn todos_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn user_todo_by_id(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, TodoError>;
        async fn create_todo_for_user(
            &self,
            user_id: i32,
            new_todo: &CreateTodo,
            ext_cxn: &impl Transactable,
            u_detect: &impl DetectUser,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn update_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            update: &UpdateTodo,
            ext_cxn: &impl Transactable,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn delete_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &impl Transactable,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn todos_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_read
            .todos_for_user(user_id, &mut *ext_cxn)
            .await
            .context("fetching todos for a user")?;

        Ok(todos)
    }

    async fn user_todo_by_id(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, TodoError> {
        let todo = todo_read
            .user_todo_by_id(user_id, todo_id, &mut *ext_cxn)
            .await
            .context("fetching a user's todo")?;

        todo.ok_or(TodoError::NotFound)
    }

    async fn create_todo_for_user(
        &self,
        user_id: i32,
        new_todo: &CreateTodo,
        ext_cxn: &impl Transactable,
        u_detect: &impl DetectUser,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .map_err(TodoError::CreateFailure)?;

        match insert_todo(user_id, new_todo, &mut txn, u_detect, todo_write).await {
            Ok(todo) => {
                txn.commit()
                    .await
                    .context("committing new todo")
                    .map_err(TodoError::CreateFailure)?;
                Ok(todo)
            }
            Err(cause) => {
                domain::roll_back(txn, "creating a todo").await;
                Err(TodoError::CreateFailure(cause))
            }
        }
    }

    async fn update_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        update: &UpdateTodo,
        ext_cxn: &impl Transactable,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting todo update")?;

        match merge_todo_update(user_id, todo_id, update, &mut txn, todo_read, todo_write).await {
            Ok(todo) => {
                txn.commit()
                    .await
                    .context("committing todo update")
                    .map_err(TodoError::UpdateFailure)?;
                Ok(todo)
            }
            Err(err) => {
                domain::roll_back(txn, "updating a todo").await;
                Err(err)
            }
        }
    }

    async fn delete_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &impl Transactable,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting todo delete")?;

        match remove_todo(user_id, todo_id, &mut txn, todo_read, todo_write).await {
            Ok(()) => {
                txn.commit().await.context("committing todo delete")?;
                Ok(())
            }
            Err(err) => {
                domain::roll_back(txn, "deleting a todo").await;
                Err(err)
            }
        }
    }
}

async fn insert_todo(
    user_id: i32,
    new_todo: &CreateTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    u_detect: &impl DetectUser,
    todo_write: &impl TodoWriter,
) -> Result<Todo, anyhow::Error> {
    domain::user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

    todo_write
        .create_todo_for_user(user_id, new_todo, &mut *ext_cxn)
        .await
}

async fn merge_todo_update(
    user_id: i32,
    todo_id: i32,
    update: &UpdateTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<Todo, TodoError> {
    let mut todo = todo_read
        .user_todo_by_id(user_id, todo_id, &mut *ext_cxn)
        .await
        .context("looking up todo to update")?
        .ok_or(TodoError::NotFound)?;

    todo.apply_update(update);

    todo_write
        .update_todo(&todo, &mut *ext_cxn)
        .await
        .map_err(TodoError::UpdateFailure)
}

async fn remove_todo(
    user_id: i32,
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<(), TodoError> {
    let existing = todo_read
        .user_todo_by_id(user_id, todo_id, &mut *ext_cxn)
        .await
        .context("looking up todo to delete")?;
    if existing.is_none() {
        return Err(TodoError::NotFound);
    }

    todo_write
        .delete_todo(user_id, todo_id, &mut *ext_cxn)
        .await
        .context("deleting a todo")?;

    Ok(())
}
