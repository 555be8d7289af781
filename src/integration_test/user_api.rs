use super::test_util::prepare_db_and_test;
use crate::api::test_util::deserialize_body;
use crate::domain::user::driving_ports::UserPort;
use crate::dto;
use crate::persistence;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

const EMAIL: &str = "mail@mail.com";

fn test_router(pool: sqlx::PgPool) -> Router {
    crate::todo_app_router(persistence::ExternalConnectivity::new(pool))
}

async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let request_builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "localhost:5000");
    let request = match body {
        Some(json_body) => request_builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string())),
        None => request_builder.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("request should complete")
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn users_can_be_created_looked_up_and_deleted() {
    prepare_db_and_test(|pool| async move {
        let router = test_router(pool);

        let create_response = send_json(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "email": EMAIL })),
        )
        .await;
        assert_eq!(StatusCode::OK, create_response.status());

        let created: dto::user::User = deserialize_body(create_response.into_body()).await;
        assert_eq!(EMAIL, created.email);

        let all_users: Vec<dto::user::User> = deserialize_body(
            send_json(&router, Method::GET, "/users", None)
                .await
                .into_body(),
        )
        .await;
        assert_eq!(1, all_users.len());
        assert_eq!(EMAIL, all_users[0].email);

        let by_email: dto::user::User = deserialize_body(
            send_json(&router, Method::GET, &format!("/users/email/{EMAIL}"), None)
                .await
                .into_body(),
        )
        .await;
        assert_eq!(created.id, by_email.id);

        let by_id: dto::user::User = deserialize_body(
            send_json(&router, Method::GET, &format!("/users/{}", created.id), None)
                .await
                .into_body(),
        )
        .await;
        assert_eq!(EMAIL, by_id.email);

        let delete_response = send_json(
            &router,
            Method::DELETE,
            &format!("/users/{}", created.id),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, delete_response.status());

        let deleted: dto::user::User = deserialize_body(delete_response.into_body()).await;
        assert!(deleted.deleted_at.is_some());

        let refetch_response =
            send_json(&router, Method::GET, &format!("/users/{}", created.id), None).await;
        assert_eq!(StatusCode::NOT_FOUND, refetch_response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn duplicate_emails_are_rejected_by_storage() {
    prepare_db_and_test(|pool| async move {
        let router = test_router(pool);

        let first_response = send_json(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "email": EMAIL })),
        )
        .await;
        assert_eq!(StatusCode::OK, first_response.status());

        let second_response = send_json(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "email": EMAIL })),
        )
        .await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, second_response.status());

        // The constraint violation must not have left a second row behind
        let all_users: Vec<dto::user::User> = deserialize_body(
            send_json(&router, Method::GET, "/users", None)
                .await
                .into_body(),
        )
        .await;
        assert_eq!(1, all_users.len());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn user_emails_can_be_updated_through_the_write_port() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_service = crate::domain::user::UserService {};
        let user_read = persistence::db_user_driven_ports::DbUserReader {};
        let user_write = persistence::db_user_driven_ports::DbUserWriter {};

        let created = user_service
            .create_user(
                &crate::domain::user::CreateUser {
                    email: "before@mail.com".to_owned(),
                },
                &mut ext_cxn,
                &user_write,
            )
            .await
            .expect("user creation should succeed");

        let updated = user_service
            .update_user(
                created.id,
                &crate::domain::user::UpdateUser {
                    email: Some("after@mail.com".to_owned()),
                },
                &mut ext_cxn,
                &user_read,
                &user_write,
            )
            .await
            .expect("user update should succeed");
        assert_eq!("after@mail.com", updated.email);

        let refetched = user_service
            .user_by_id(created.id, &mut ext_cxn, &user_read)
            .await
            .expect("user should still exist");
        assert_eq!("after@mail.com", refetched.email);
    });
}
