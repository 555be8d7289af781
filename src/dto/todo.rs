use crate::domain;
use crate::routing_utils::UrlContext;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// DTO for creating a new todo via the API
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[schema(example = "walk the dog")]
    pub title: String,
    #[schema(example = 523)]
    pub order: Option<i32>,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo {
            title: value.title,
            order: value.order,
        }
    }
}

/// DTO for partially updating a todo via the API. Only the fields listed here can
/// be changed; anything else in the request body is dropped rather than forwarded
/// to storage.
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    pub title: Option<String>,
    #[schema(example = 95)]
    pub order: Option<i32>,
    pub completed: Option<bool>,
}

impl From<UpdateTodo> for domain::todo::UpdateTodo {
    fn from(value: UpdateTodo) -> Self {
        domain::todo::UpdateTodo {
            title: value.title,
            order: value.order,
            completed: value.completed,
        }
    }
}

/// Wire representation of a todo. There is no id field; the synthesized `url`
/// is how clients navigate back to an individual todo.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoItem {
    #[schema(example = "walk the dog")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 523)]
    pub order: Option<i32>,
    pub completed: bool,
    #[schema(example = "http://localhost:5000/todos/10")]
    pub url: String,
}

impl TodoItem {
    /// Builds the wire shape for a todo from a snapshot of the entity plus the
    /// inbound request's scheme and host. Pure; the URL is derived, never stored.
    pub fn for_todo(ctx: &UrlContext, todo: &domain::todo::Todo) -> TodoItem {
        TodoItem {
            title: todo.title.clone(),
            order: todo.order,
            completed: todo.completed,
            url: format!("{}://{}/todos/{}", ctx.scheme, ctx.host, todo.id),
        }
    }
}
