use crate::domain;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The raw persisted representation of a user as returned by the API. User
/// responses carry no derived fields, just the row as it stands (including the
/// deletion timestamp once a user has been soft deleted).
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct User {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "mail@mail.com")]
    pub email: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<domain::user::User> for User {
    fn from(value: domain::user::User) -> Self {
        User {
            id: value.id,
            email: value.email,
            deleted_at: value.lifecycle.deleted_at(),
        }
    }
}

/// DTO for creating a new user via the API
#[derive(Deserialize, Display, ToSchema)]
#[display("{email}")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewUser {
    #[schema(example = "mail@mail.com")]
    pub email: String,
}

impl From<NewUser> for domain::user::CreateUser {
    fn from(value: NewUser) -> Self {
        domain::user::CreateUser { email: value.email }
    }
}
