use crate::dto::todo::TodoItem;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{DomainErrorResponse, GenericErrorResponse, Json, UrlContext};
use crate::{domain, dto, persistence, AppState, SharedData};
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

/// Defines the OpenAPI documentation for the todo API
#[derive(OpenApi)]
#[openapi(paths(
    list_todos,
    get_todo,
    create_todo,
    update_todo,
    delete_all_todos,
    delete_todo
))]
pub struct TodosApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Builds a router for all the todo routes
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState, url_ctx: UrlContext| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                list_todos(url_ctx, &mut ext_cxn, &todo_service).await
            })
            .post(
                |State(app_state): AppState,
                 url_ctx: UrlContext,
                 Json(new_todo): Json<dto::todo::NewTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    create_todo(new_todo, url_ctx, &mut ext_cxn, &todo_service).await
                },
            )
            .delete(|State(app_state): AppState, url_ctx: UrlContext| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                delete_all_todos(url_ctx, &mut ext_cxn, &todo_service).await
            }),
        )
        .route(
            "/:todo_id",
            get(
                |State(app_state): AppState, Path(todo_id): Path<i32>, url_ctx: UrlContext| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    get_todo(todo_id, url_ctx, &mut ext_cxn, &todo_service).await
                },
            )
            .patch(
                |State(app_state): AppState,
                 Path(todo_id): Path<i32>,
                 url_ctx: UrlContext,
                 Json(update): Json<dto::todo::UpdateTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    update_todo(todo_id, update, url_ctx, &mut ext_cxn, &todo_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(todo_id): Path<i32>, url_ctx: UrlContext| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    delete_todo(todo_id, url_ctx, &mut ext_cxn, &todo_service).await
                },
            ),
        )
}

/// Lists every todo that hasn't been soft deleted
#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "All active todos", body = Vec<TodoItem>),
        (status = 500, description = "The todo list could not be fetched"),
    ),
)]
async fn list_todos(
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<Vec<TodoItem>>, ErrorResponse> {
    info!("Requested all active todos");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};

    let todos_result = todo_service.all_todos(&mut *ext_cxn, &todo_read).await;
    if let Err(ref err) = todos_result {
        error!("Could not fetch all todos: {err}");
    }
    let todos = todos_result.map_err(GenericErrorResponse)?;

    Ok(Json(
        todos
            .iter()
            .map(|todo| TodoItem::for_todo(&url_ctx, todo))
            .collect(),
    ))
}

/// Fetches a single active todo by its ID
#[utoipa::path(
    get,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = i32, Path, description = "ID of the todo to fetch"),
    ),
    responses(
        (status = 200, description = "The requested todo", body = TodoItem),
        (status = 404, description = "No active todo has the given ID"),
        (status = 500, description = "The todo could not be fetched"),
    ),
)]
async fn get_todo(
    todo_id: i32,
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<TodoItem>, ErrorResponse> {
    info!("Requested todo {todo_id}");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};

    let todo_result = todo_service
        .todo_by_id(todo_id, &mut *ext_cxn, &todo_read)
        .await;
    if let Err(ref err) = todo_result {
        // We don't want to log an error for the "no results" case
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not fetch todo {todo_id}: {other}"),
        }
    }
    let todo = todo_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(TodoItem::for_todo(&url_ctx, &todo)))
}

/// Adds a new todo to the list. New todos always start out incomplete.
#[utoipa::path(
    post,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::todo::NewTodo,
    responses(
        (status = 200, description = "The created todo", body = TodoItem),
        (status = 400, description = "The request body was malformed"),
        (status = 500, description = "The todo could not be created"),
    ),
)]
async fn create_todo(
    new_todo: dto::todo::NewTodo,
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<TodoItem>, ErrorResponse> {
    info!("Creating todo \"{}\"", new_todo.title);
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};
    let domain_new_todo = domain::todo::NewTodo::from(new_todo);

    let create_result = todo_service
        .create_todo(&domain_new_todo, &mut *ext_cxn, &todo_write)
        .await;
    if let Err(ref err) = create_result {
        error!("Could not post todo: {err}");
    }
    let created = create_result.map_err(GenericErrorResponse)?;

    Ok(Json(TodoItem::for_todo(&url_ctx, &created)))
}

/// Applies a partial update to an active todo. Fields absent from the body keep
/// their persisted values.
#[utoipa::path(
    patch,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = i32, Path, description = "ID of the todo to update"),
    ),
    request_body = dto::todo::UpdateTodo,
    responses(
        (status = 200, description = "The todo after the update", body = TodoItem),
        (status = 400, description = "The request body was malformed"),
        (status = 404, description = "No active todo has the given ID"),
        (status = 500, description = "The todo could not be updated"),
    ),
)]
async fn update_todo(
    todo_id: i32,
    update: dto::todo::UpdateTodo,
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<TodoItem>, ErrorResponse> {
    info!("Updating todo {todo_id}");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};
    let domain_update = domain::todo::UpdateTodo::from(update);

    let update_result = todo_service
        .update_todo(
            todo_id,
            &domain_update,
            &mut *ext_cxn,
            &todo_read,
            &todo_write,
        )
        .await;
    if let Err(ref err) = update_result {
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not patch todo {todo_id}: {other}"),
        }
    }
    let updated = update_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(TodoItem::for_todo(&url_ctx, &updated)))
}

/// Hard deletes every todo regardless of soft-delete state, reporting the removed rows
#[utoipa::path(
    delete,
    path = "/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "Every todo that was removed", body = Vec<TodoItem>),
        (status = 500, description = "The todo list could not be cleared"),
    ),
)]
async fn delete_all_todos(
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<Vec<TodoItem>>, ErrorResponse> {
    info!("Clearing the todo list");
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};

    let clear_result = todo_service.clear_todos(&mut *ext_cxn, &todo_write).await;
    if let Err(ref err) = clear_result {
        error!("Could not delete all todos: {err}");
    }
    let cleared = clear_result.map_err(GenericErrorResponse)?;

    Ok(Json(
        cleared
            .iter()
            .map(|todo| TodoItem::for_todo(&url_ctx, todo))
            .collect(),
    ))
}

/// Soft deletes a single todo, reporting the row as it stands after the update
#[utoipa::path(
    delete,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = i32, Path, description = "ID of the todo to delete"),
    ),
    responses(
        (status = 200, description = "The todo that was deleted", body = TodoItem),
        (status = 404, description = "No active todo has the given ID"),
        (status = 500, description = "The todo could not be deleted"),
    ),
)]
async fn delete_todo(
    todo_id: i32,
    url_ctx: UrlContext,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl domain::todo::driving_ports::TodoPort,
) -> Result<Json<TodoItem>, ErrorResponse> {
    info!("Deleting todo {todo_id}");
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};

    let delete_result = todo_service
        .soft_delete_todo(todo_id, &mut *ext_cxn, &todo_write)
        .await;
    if let Err(ref err) = delete_result {
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not delete todo {todo_id}: {other}"),
        }
    }
    let deleted = delete_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(TodoItem::for_todo(&url_ctx, &deleted)))
}
