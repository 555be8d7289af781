use crate::domain::{Error, Lifecycle};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use async_trait::async_trait;

/// A todo item as it exists in the system. The soft-delete column on storage is
/// surfaced here as the [Lifecycle] state rather than a nullable timestamp.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub order: Option<i32>,
    pub completed: bool,
    pub owner_user_id: Option<i32>,
    pub private: bool,
    pub lifecycle: Lifecycle,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTodo {
    pub title: String,
    pub order: Option<i32>,
}

/// The enumerated set of fields a caller may change on a todo. Fields left as
/// [None] keep their persisted value.
#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub order: Option<i32>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// True if at least one field assignment would be applied by this update
    pub fn changes_anything(&self) -> bool {
        self.title.is_some() || self.order.is_some() || self.completed.is_some()
    }
}

pub mod driven_ports {
    use super::*;

    #[async_trait]
    pub trait TodoReader: Sync {
        async fn all_active(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    #[async_trait]
    pub trait TodoWriter: Sync {
        async fn create(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        async fn update(
            &self,
            id: i32,
            update: &UpdateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        async fn soft_delete(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        async fn delete_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[async_trait]
    pub trait TodoPort {
        async fn all_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn todo_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, Error>;
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, anyhow::Error>;
        async fn update_todo(
            &self,
            id: i32,
            update: &UpdateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, Error>;
        async fn soft_delete_todo(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, Error>;
        async fn clear_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Vec<Todo>, anyhow::Error>;
    }
}

pub struct TodoService {}

#[async_trait]
impl driving_ports::TodoPort for TodoService {
    async fn all_todos(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl driven_ports::TodoReader,
    ) -> Result<Vec<Todo>, anyhow::Error> {
        todo_read
            .all_active(&mut *ext_cxn)
            .await
            .context("Fetching all active todos")
    }

    async fn todo_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl driven_ports::TodoReader,
    ) -> Result<Todo, Error> {
        let todo = todo_read
            .by_id(id, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("fetch a todo"))?;

        todo.ok_or(Error::DoesNotExist)
    }

    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl driven_ports::TodoWriter,
    ) -> Result<Todo, anyhow::Error> {
        todo_write
            .create(new_todo, &mut *ext_cxn)
            .await
            .context("Creating a todo")
    }

    async fn update_todo(
        &self,
        id: i32,
        update: &UpdateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl driven_ports::TodoReader,
        todo_write: &impl driven_ports::TodoWriter,
    ) -> Result<Todo, Error> {
        // An empty field set would produce an UPDATE with no assignments, so just
        // report the todo as it currently stands
        if !update.changes_anything() {
            let unchanged = todo_read
                .by_id(id, &mut *ext_cxn)
                .await
                .map_err(Error::retrieving("fetch a todo"))?;
            return unchanged.ok_or(Error::DoesNotExist);
        }

        let updated = todo_write
            .update(id, update, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("update a todo"))?;

        updated.ok_or(Error::DoesNotExist)
    }

    async fn soft_delete_todo(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl driven_ports::TodoWriter,
    ) -> Result<Todo, Error> {
        let deleted = todo_write
            .soft_delete(id, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("delete a todo"))?;

        deleted.ok_or(Error::DoesNotExist)
    }

    async fn clear_todos(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl driven_ports::TodoWriter,
    ) -> Result<Vec<Todo>, anyhow::Error> {
        todo_write
            .delete_all(&mut *ext_cxn)
            .await
            .context("Clearing the todo list")
    }
}
