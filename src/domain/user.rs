use crate::domain::{Error, Lifecycle};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use async_trait::async_trait;

/// A user as it exists in the system. Users are only ever soft deleted, so the
/// deletion timestamp survives as part of the [Lifecycle] state.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub lifecycle: Lifecycle,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct CreateUser {
    pub email: String,
}

/// The enumerated set of fields a caller may change on a user
#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateUser {
    pub email: Option<String>,
}

impl UpdateUser {
    pub fn changes_anything(&self) -> bool {
        self.email.is_some()
    }
}

pub mod driven_ports {
    use super::*;

    #[async_trait]
    pub trait UserReader: Sync {
        async fn all_active(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
        async fn by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    #[async_trait]
    pub trait UserWriter: Sync {
        /// Inserts a new user. Email uniqueness is enforced by the storage layer, and
        /// a violation surfaces here as a plain port failure.
        async fn create(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, anyhow::Error>;

        async fn update(
            &self,
            id: i32,
            update: &UpdateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;

        async fn soft_delete(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[async_trait]
    pub trait UserPort {
        async fn create_user(
            &self,
            new_user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, anyhow::Error>;
        async fn all_users(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn user_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<User, Error>;
        async fn user_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<User, Error>;
        async fn update_user(
            &self,
            id: i32,
            update: &UpdateUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, Error>;
        async fn soft_delete_user(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, Error>;
    }
}

pub struct UserService {}

#[async_trait]
impl driving_ports::UserPort for UserService {
    async fn create_user(
        &self,
        new_user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, anyhow::Error> {
        u_writer
            .create(new_user, &mut *ext_cxn)
            .await
            .context("Creating a user")
    }

    async fn all_users(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Vec<User>, anyhow::Error> {
        u_reader
            .all_active(&mut *ext_cxn)
            .await
            .context("Fetching all active users")
    }

    async fn user_by_id(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<User, Error> {
        let user = u_reader
            .by_id(id, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("fetch a user"))?;

        user.ok_or(Error::DoesNotExist)
    }

    async fn user_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<User, Error> {
        let user = u_reader
            .by_email(email, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("fetch a user by email"))?;

        user.ok_or(Error::DoesNotExist)
    }

    async fn update_user(
        &self,
        id: i32,
        update: &UpdateUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, Error> {
        if !update.changes_anything() {
            let unchanged = u_reader
                .by_id(id, &mut *ext_cxn)
                .await
                .map_err(Error::retrieving("fetch a user"))?;
            return unchanged.ok_or(Error::DoesNotExist);
        }

        let updated = u_writer
            .update(id, update, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("update a user"))?;

        updated.ok_or(Error::DoesNotExist)
    }

    async fn soft_delete_user(
        &self,
        id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, Error> {
        let deleted = u_writer
            .soft_delete(id, &mut *ext_cxn)
            .await
            .map_err(Error::retrieving("delete a user"))?;

        deleted.ok_or(Error::DoesNotExist)
    }
}
