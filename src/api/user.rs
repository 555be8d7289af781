use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{DomainErrorResponse, GenericErrorResponse, Json};
use crate::{domain, dto, persistence, AppState, SharedData};
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

/// Defines the OpenAPI documentation for the user API
#[derive(OpenApi)]
#[openapi(paths(create_user, get_users, get_user, find_user_by_email, delete_user))]
pub struct UsersApi;
/// Constant used to group user endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Users";

/// Builds a router for all the user routes
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let user_service = domain::user::UserService {};

                get_users(&mut ext_cxn, &user_service).await
            })
            .post(
                |State(app_state): AppState, Json(new_user): Json<dto::user::NewUser>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    create_user(new_user, &mut ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/:user_id",
            get(
                |State(app_state): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    get_user(user_id, &mut ext_cxn, &user_service).await
                },
            )
            .delete(
                |State(app_state): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    delete_user(user_id, &mut ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/email/:email",
            get(
                |State(app_state): AppState, Path(email): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    find_user_by_email(email, &mut ext_cxn, &user_service).await
                },
            ),
        )
}

/// Creates a user. Email uniqueness is left to the storage layer, so a duplicate
/// email surfaces as the generic failure response rather than anything specific.
#[utoipa::path(
    post,
    path = "/users",
    tag = USER_API_GROUP,
    request_body = dto::user::NewUser,
    responses(
        (status = 200, description = "The created user", body = dto::user::User),
        (status = 400, description = "The request body was malformed"),
        (status = 500, description = "The user could not be created"),
    ),
)]
async fn create_user(
    new_user: dto::user::NewUser,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<dto::user::User>, ErrorResponse> {
    info!("Attempt to create user: {new_user}");
    let user_write = persistence::db_user_driven_ports::DbUserWriter {};
    let domain_new_user = domain::user::CreateUser::from(new_user);

    let creation_result = user_service
        .create_user(&domain_new_user, &mut *ext_cxn, &user_write)
        .await;
    if let Err(ref err) = creation_result {
        error!("Could not create user: {err}");
    }
    let created = creation_result.map_err(GenericErrorResponse)?;

    Ok(Json(created.into()))
}

/// Retrieves a list of all the active users in the system
#[utoipa::path(
    get,
    path = "/users",
    tag = USER_API_GROUP,
    responses(
        (status = 200, description = "All active users", body = Vec<dto::user::User>),
        (status = 500, description = "The user list could not be fetched"),
    ),
)]
async fn get_users(
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<Vec<dto::user::User>>, ErrorResponse> {
    info!("Requested users");
    let user_read = persistence::db_user_driven_ports::DbUserReader {};

    let users_result = user_service.all_users(&mut *ext_cxn, &user_read).await;
    if let Err(ref err) = users_result {
        error!("Could not get all users: {err}");
    }
    let users = users_result.map_err(GenericErrorResponse)?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Fetches a single active user by their ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the user to fetch"),
    ),
    responses(
        (status = 200, description = "The requested user", body = dto::user::User),
        (status = 404, description = "No active user has the given ID"),
        (status = 500, description = "The user could not be fetched"),
    ),
)]
async fn get_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<dto::user::User>, ErrorResponse> {
    info!("Requested user {user_id}");
    let user_read = persistence::db_user_driven_ports::DbUserReader {};

    let user_result = user_service
        .user_by_id(user_id, &mut *ext_cxn, &user_read)
        .await;
    if let Err(ref err) = user_result {
        // We don't want to log an error for the "no results" case
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not get user {user_id}: {other}"),
        }
    }
    let user = user_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(user.into()))
}

/// Fetches a single active user by their email address
#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = USER_API_GROUP,
    params(
        ("email" = String, Path, description = "Email of the user to fetch"),
    ),
    responses(
        (status = 200, description = "The requested user", body = dto::user::User),
        (status = 404, description = "No active user has the given email"),
        (status = 500, description = "The user could not be fetched"),
    ),
)]
async fn find_user_by_email(
    email: String,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<dto::user::User>, ErrorResponse> {
    info!("Requested user with email {email}");
    let user_read = persistence::db_user_driven_ports::DbUserReader {};

    let user_result = user_service
        .user_by_email(&email, &mut *ext_cxn, &user_read)
        .await;
    if let Err(ref err) = user_result {
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not find user by email: {other}"),
        }
    }
    let user = user_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(user.into()))
}

/// Soft deletes a user, reporting the row as it stands after the update
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the user to delete"),
    ),
    responses(
        (status = 200, description = "The user that was deleted", body = dto::user::User),
        (status = 404, description = "No active user has the given ID"),
        (status = 500, description = "The user could not be deleted"),
    ),
)]
async fn delete_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<dto::user::User>, ErrorResponse> {
    info!("Deleting user {user_id}");
    let user_write = persistence::db_user_driven_ports::DbUserWriter {};

    let delete_result = user_service
        .soft_delete_user(user_id, &mut *ext_cxn, &user_write)
        .await;
    if let Err(ref err) = delete_result {
        match err {
            domain::Error::DoesNotExist => {}
            other => error!("Could not delete user {user_id}: {other}"),
        }
    }
    let deleted = delete_result.map_err(DomainErrorResponse::from)?;

    Ok(Json(deleted.into()))
}
