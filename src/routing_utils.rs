use crate::domain;
use async_trait::async_trait;
use axum::extract::rejection::{HostRejection, JsonRejection};
use axum::extract::{FromRequestParts, Host};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;
use serde::Serialize;
use utoipa::ToResponse;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[response(examples(
    ("Not Found" = (
        summary = "Entity could not be found (404)",
        value = json!({
            "error_code": "not_found",
            "error_description": "The requested entity could not be found.",
            "extra_info": null
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error_description": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<String>,
}

/// Response type that wraps domain errors and turns them into [BasicErrorResponse]s.
/// This is the single conversion point between failures propagated out of the
/// domain and the generic bodies clients see; failure detail is logged at the
/// handler, never surfaced here.
pub enum DomainErrorResponse {
    NotFound,
    Internal,
}

impl IntoResponse for DomainErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(BasicErrorResponse {
                    error_code: "not_found".into(),
                    error_description: "The requested entity could not be found.".into(),
                    extra_info: None,
                }),
            )
                .into_response(),

            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BasicErrorResponse {
                    error_code: "internal_error".into(),
                    error_description: "Could not access data to complete your request".into(),
                    extra_info: None,
                }),
            )
                .into_response(),
        }
    }
}

impl From<domain::Error> for DomainErrorResponse {
    fn from(value: domain::Error) -> Self {
        match value {
            domain::Error::DoesNotExist => Self::NotFound,
            domain::Error::RetrieveFailure { .. } => Self::Internal,
        }
    }
}

/// Response type for handlers whose failures carry no not-found case. Any error
/// landing here becomes the generic 500 body.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        tracing::debug!("Converting failure into a generic 500: {}", self.0);
        DomainErrorResponse::Internal.into_response()
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description: "The passed request body contained malformed or unreadable JSON."
                    .into(),
                extra_info: Some(self.parse_problem),
            }),
        )
            .into_response()
    }
}

/// The pieces of the inbound request needed to synthesize self-referential URLs:
/// the scheme the client spoke and the host it addressed. The scheme honors
/// X-Forwarded-Proto so URLs stay correct behind a TLS-terminating proxy.
pub struct UrlContext {
    pub scheme: String,
    pub host: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for UrlContext
where
    S: Send + Sync,
{
    type Rejection = HostRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Host(host) = Host::from_request_parts(parts, state).await?;
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|proto| proto.to_str().ok())
            .unwrap_or("http")
            .to_owned();

        Ok(UrlContext { scheme, host })
    }
}
