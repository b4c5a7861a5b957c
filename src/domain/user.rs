use crate::domain;
use crate::domain::FieldUpdate;
use crate::domain::todo::Todo;
use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::user::driving_ports::UserError;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Merges the fields present in [update] over this user
    pub fn apply_update(&mut self, update: &UpdateUser) {
        update.name.apply_to(&mut self.name);
        update.email.apply_to(&mut self.email);
    }
}

/// A user along with every todo they own, which is how users are handed back to callers
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct UserWithTodos {
    pub user: User,
    pub todos: Vec<Todo>,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateUser {
    pub name: FieldUpdate<String>,
    pub email: FieldUpdate<String>,
}

/// Offset/limit window over the user list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest { skip: 0, limit: 10 }
    }
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait UserReader {
        async fn get_page(
            &self,
            page: PageRequest,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn get_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        async fn create_user(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, anyhow::Error>;
        /// Persists the name and email of [user] and returns the stored row with a refreshed
        /// `updated_at`
        async fn update_user(
            &self,
            user: &User,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, anyhow::Error>;
        async fn delete_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }

    pub trait DetectUser {
        async fn user_exists(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::{ExternalConnectivity, Transactable};

    #[derive(Debug, Error)]
    pub enum UserError {
        #[error("User not found")]
        NotFound,
        #[error("Error creating user: {0:#}")]
        CreateFailure(anyhow::Error),
        #[error("Error updating user: {0:#}")]
        UpdateFailure(anyhow::Error),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait UserPort {
        async fn get_users(
            &self,
            page: PageRequest,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            todo_read: &impl TodoReader,
        ) -> Result<Vec<UserWithTodos>, UserError>;
        async fn get_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            todo_read: &impl TodoReader,
        ) -> Result<UserWithTodos, UserError>;
        async fn create_user(
            &self,
            new_user: &CreateUser,
            ext_cxn: &impl Transactable,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<UserWithTodos, UserError>;
        async fn update_user(
            &self,
            user_id: i32,
            update: &UpdateUser,
            ext_cxn: &impl Transactable,
            u_reader: &impl driven_ports::UserReader,
            u_writer: &impl driven_ports::UserWriter,
            todo_read: &impl TodoReader,
        ) -> Result<UserWithTodos, UserError>;
        async fn delete_user(
            &self,
            user_id: i32,
            ext_cxn: &impl Transactable,
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
            todo_write: &impl TodoWriter,
        ) -> Result<(), UserError>;
    }
}

pub struct UserService {}

#[derive(Debug, Error)]
pub(super) enum UserExistsErr {
    #[error("user with ID {0} does not exist")]
    UserDoesNotExist(i32),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

pub(super) async fn verify_user_exists(
    id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_detect: &impl driven_ports::DetectUser,
) -> Result<(), UserExistsErr> {
    let does_user_exist = user_detect.user_exists(id, &mut *ext_cxn).await?;

    if does_user_exist {
        Ok(())
    } else {
        Err(UserExistsErr::UserDoesNotExist(id))
    }
}


/// Pairs each user with the todos they own, keeping the users' order
fn attach_todos(users: Vec<User>, mut todos: Vec<Todo>) -> Vec<UserWithTodos> {
    todos.sort_by_key(|todo| todo.id);

    users
        .into_iter()
        .map(|user| {
            let owned_todos = todos
                .iter()
                .filter(|todo| todo.owner_user_id == user.id)
                .cloned()
                .collect();

            UserWithTodos {
                user,
                todos: owned_todos,
            }
        })
        .collect()
}

async fn load_user_with_todos(
    user: User,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_read: &impl TodoReader,
) -> Result<UserWithTodos, anyhow::Error> {
    let todos = todo_read
        .todos_for_user(user.id, &mut *ext_cxn)
        .await
        .context("fetching todos owned by user")?;

    Ok(UserWithTodos { user, todos })
}

impl driving_ports::UserPort for UserService {
    async fn get_users(
        &self,
        page: PageRequest,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<UserWithTodos>, UserError> {
        let users = u_reader
            .get_page(page, &mut *ext_cxn)
            .await
            .context("fetching a page of users")?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i32> = users.iter().map(|user| user.id).collect();
        let todos = todo_read
            .todos_for_users(&user_ids, &mut *ext_cxn)
            .await
            .context("fetching todos for a page of users")?;

        Ok(attach_todos(users, todos))
    }

    async fn get_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        todo_read: &impl TodoReader,
    ) -> Result<UserWithTodos, UserError> {
        let user = u_reader
            .get_by_id(user_id, &mut *ext_cxn)
            .await
            .context("fetching a user by id")?
            .ok_or(UserError::NotFound)?;

        Ok(load_user_with_todos(user, &mut *ext_cxn, todo_read).await?)
    }

    async fn create_user(
        &self,
        new_user: &CreateUser,
        ext_cxn: &impl Transactable,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<UserWithTodos, UserError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .map_err(UserError::CreateFailure)?;

        match u_writer.create_user(new_user, &mut txn).await {
            Ok(user) => {
                txn.commit()
                    .await
                    .context("committing new user")
                    .map_err(UserError::CreateFailure)?;

                Ok(UserWithTodos {
                    user,
                    todos: Vec::new(),
                })
            }
            Err(cause) => {
                domain::roll_back(txn, "creating a user").await;
                Err(UserError::CreateFailure(cause))
            }
        }
    }

    async fn update_user(
        &self,
        user_id: i32,
        update: &UpdateUser,
        ext_cxn: &impl Transactable,
        u_reader: &impl driven_ports::UserReader,
        u_writer: &impl driven_ports::UserWriter,
        todo_read: &impl TodoReader,
    ) -> Result<UserWithTodos, UserError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting user update")?;

        let update_result = merge_user_update(user_id, update, &mut txn, u_reader, u_writer).await;
        let updated_user = match update_result {
            Ok(user) => user,
            Err(err) => {
                domain::roll_back(txn, "updating a user").await;
                return Err(err);
            }
        };

        let loaded = load_user_with_todos(updated_user, &mut txn, todo_read).await;
        match loaded {
            Ok(user_with_todos) => {
                txn.commit()
                    .await
                    .context("committing user update")
                    .map_err(UserError::UpdateFailure)?;
                Ok(user_with_todos)
            }
            Err(err) => {
                domain::roll_back(txn, "updating a user").await;
                Err(UserError::PortError(err))
            }
        }
    }

    async fn delete_user(
        &self,
        user_id: i32,
        ext_cxn: &impl Transactable,
        u_detect: &impl driven_ports::DetectUser,
        u_writer: &impl driven_ports::UserWriter,
        todo_write: &impl TodoWriter,
    ) -> Result<(), UserError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting user delete")?;

        match remove_user_and_todos(user_id, &mut txn, u_detect, u_writer, todo_write).await {
            Ok(()) => {
                txn.commit().await.context("committing user delete")?;
                Ok(())
            }
            Err(err) => {
                domain::roll_back(txn, "deleting a user").await;
                Err(err)
            }
        }
    }
}

async fn merge_user_update(
    user_id: i32,
    update: &UpdateUser,
    ext_cxn: &mut impl ExternalConnectivity,
    u_reader: &impl driven_ports::UserReader,
    u_writer: &impl driven_ports::UserWriter,
) -> Result<User, UserError> {
    let mut user = u_reader
        .get_by_id(user_id, &mut *ext_cxn)
        .await
        .context("looking up user to update")?
        .ok_or(UserError::NotFound)?;

    user.apply_update(update);

    u_writer
        .update_user(&user, &mut *ext_cxn)
        .await
        .map_err(UserError::UpdateFailure)
}

async fn remove_user_and_todos(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    u_detect: &impl driven_ports::DetectUser,
    u_writer: &impl driven_ports::UserWriter,
    todo_write: &impl TodoWriter,
) -> Result<(), UserError> {
    match verify_user_exists(user_id, &mut *ext_cxn, u_detect).await {
        Ok(()) => {}
        Err(UserExistsErr::UserDoesNotExist(_)) => return Err(UserError::NotFound),
        Err(UserExistsErr::PortError(err)) => {
            return Err(UserError::PortError(err.context("looking up user to delete")));
        }
    }

    todo_write
        .delete_todos_for_user(user_id, &mut *ext_cxn)
        .await
        .context("deleting todos owned by user")?;
    u_writer
        .delete_user(user_id, &mut *ext_cxn)
        .await
        .context("deleting user")?;

    Ok(())
}
