use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod todo;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;

/// The lifecycle state of a persisted record. Records are never physically removed
/// by the ordinary delete operations; they move to [Lifecycle::Deleted] and are
/// excluded from every standard query from then on.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub enum Lifecycle {
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    /// Reconstructs the lifecycle state from a nullable deletion timestamp as stored
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::Deleted { at },
        }
    }

    /// The deletion timestamp as it is persisted, if the record is deleted
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(*at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("requested data does not exist")]
    DoesNotExist,
    #[error("failed to {action} due to a communication failure: {cause}")]
    RetrieveFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl Error {
    /// Wraps a driven port failure with the [action] being taken when it occurred
    fn retrieving(action: &str) -> impl FnOnce(anyhow::Error) -> Error {
        let action = action.to_owned();
        move |cause| Error::RetrieveFailure { action, cause }
    }
}
