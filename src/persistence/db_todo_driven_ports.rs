use crate::domain;
use crate::domain::todo::{NewTodo, Todo, UpdateTodo};
use crate::domain::Lifecycle;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};

/// Row shape shared by every statement touching the todos table. The `order`
/// column is a reserved word and stays quoted in SQL.
#[derive(FromRow)]
struct TodoRow {
    id: i32,
    title: String,
    order: Option<i32>,
    completed: bool,
    user_id: Option<i32>,
    private: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<TodoRow> for Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            order: value.order,
            completed: value.completed,
            owner_user_id: value.user_id,
            private: value.private,
            lifecycle: Lifecycle::from_deleted_at(value.deleted_at),
        }
    }
}

pub struct DbTodoReader {}

#[async_trait]
impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn all_active(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to list todos")?;

        let todos = sqlx::query_as::<_, TodoRow>(
            r#"SELECT id, title, "order", completed, user_id, private, deleted_at FROM todos WHERE deleted_at IS NULL"#,
        )
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Fetching all active todos")?
        .into_iter()
        .map(Todo::from)
        .collect();

        Ok(todos)
    }

    async fn by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to fetch a todo")?;

        let todo = sqlx::query_as::<_, TodoRow>(
            r#"SELECT id, title, "order", completed, user_id, private, deleted_at FROM todos WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a todo by id")?;

        Ok(todo.map(Todo::from))
    }
}

pub struct DbTodoWriter {}

#[async_trait]
impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to create a todo")?;

        // completed is left to the column default of false
        let todo = sqlx::query_as::<_, TodoRow>(
            r#"INSERT INTO todos(title, "order") VALUES ($1, $2) RETURNING id, title, "order", completed, user_id, private, deleted_at"#,
        )
        .bind(new_todo.title.as_str())
        .bind(new_todo.order)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Inserting new todo")?;

        Ok(todo.into())
    }

    async fn update(
        &self,
        id: i32,
        update: &UpdateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to update a todo")?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE todos SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(ref title) = update.title {
                assignments.push("title = ").push_bind_unseparated(title.as_str());
            }
            if let Some(order) = update.order {
                assignments.push("\"order\" = ").push_bind_unseparated(order);
            }
            if let Some(completed) = update.completed {
                assignments.push("completed = ").push_bind_unseparated(completed);
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(r#" AND deleted_at IS NULL RETURNING id, title, "order", completed, user_id, private, deleted_at"#);

        let todo = query
            .build_query_as::<TodoRow>()
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("Updating a todo")?;

        Ok(todo.map(Todo::from))
    }

    async fn soft_delete(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to delete a todo")?;

        let todo = sqlx::query_as::<_, TodoRow>(
            r#"UPDATE todos SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING id, title, "order", completed, user_id, private, deleted_at"#,
        )
        .bind(id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Soft deleting a todo")?;

        Ok(todo.map(Todo::from))
    }

    async fn delete_all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to clear todos")?;

        let todos = sqlx::query_as::<_, TodoRow>(
            r#"DELETE FROM todos RETURNING id, title, "order", completed, user_id, private, deleted_at"#,
        )
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Clearing the todos table")?
        .into_iter()
        .map(Todo::from)
        .collect();

        Ok(todos)
    }
}
