pub mod todo;
pub mod user;

use utoipa::OpenApi;

/// Aggregates the OpenAPI schemas for data types shared across the API so they can
/// be merged into the top-level API documentation
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        todo::NewTodo,
        todo::UpdateTodo,
        todo::TodoItem,
        user::NewUser,
        user::User,
    ),
    responses(crate::routing_utils::BasicErrorResponse)
))]
pub struct OpenApiSchemas;
