use crate::domain;
use crate::domain::user::{CreateUser, UpdateUser, User};
use crate::domain::Lifecycle;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};

#[derive(FromRow)]
struct UserRow {
    id: i32,
    email: String,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            email: value.email,
            lifecycle: Lifecycle::from_deleted_at(value.deleted_at),
        }
    }
}

pub struct DbUserReader {}

#[async_trait]
impl domain::user::driven_ports::UserReader for DbUserReader {
    async fn all_active(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<User>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to list users")?;

        let users = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, deleted_at FROM users WHERE deleted_at IS NULL",
        )
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Fetching all active users")?
        .into_iter()
        .map(User::from)
        .collect();

        Ok(users)
    }

    async fn by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to fetch a user")?;

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, deleted_at FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by id")?;

        Ok(user.map(User::from))
    }

    async fn by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to fetch a user")?;

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, deleted_at FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by email")?;

        Ok(user.map(User::from))
    }
}

pub struct DbUserWriter {}

#[async_trait]
impl domain::user::driven_ports::UserWriter for DbUserWriter {
    async fn create(
        &self,
        user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<User, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to create a user")?;

        // A duplicate email trips the unique constraint here and propagates untouched
        let user = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users(email) VALUES ($1) RETURNING id, email, deleted_at",
        )
        .bind(user.email.as_str())
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Inserting new user")?;

        Ok(user.into())
    }

    async fn update(
        &self,
        id: i32,
        update: &UpdateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to update a user")?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(ref email) = update.email {
                assignments.push("email = ").push_bind_unseparated(email.as_str());
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING id, email, deleted_at");

        let user = query
            .build_query_as::<UserRow>()
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("Updating a user")?;

        Ok(user.map(User::from))
    }

    async fn soft_delete(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn
            .database_cxn()
            .await
            .context("Acquiring connection to delete a user")?;

        let user = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING id, email, deleted_at",
        )
        .bind(id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Soft deleting a user")?;

        Ok(user.map(User::from))
    }
}
