use crate::{
    common::CORRELATION_ID_HEADER,
    error::{ApiError, Error},
};
use async_trait::async_trait;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware which translates error responses returned from the Blink Debit APIs
/// into classified [`Error`](crate::error::Error)s.
pub struct ErrorHandlingMiddleware;

#[async_trait]
impl Middleware for ErrorHandlingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let correlation_id = correlation_id(&req);

        let response = next.run(req, extensions).await?;

        if !response.status().is_success() {
            tracing::debug!("Failed HTTP request. Status code: {}", response.status());

            let api_error = api_error_from_response(response, correlation_id).await?;
            return Err(Error::from(api_error).into());
        }

        Ok(response)
    }
}

pub(crate) fn correlation_id(req: &Request) -> Option<String> {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Body of an error response from the Blink Debit APIs.
#[derive(serde::Deserialize, Debug, Default)]
struct ErrorResponseBody {
    message: Option<String>,
    error: Option<String>,
}

pub(crate) async fn api_error_from_response(
    response: Response,
    correlation_id: Option<String>,
) -> reqwest_middleware::Result<ApiError> {
    let status = response.status();

    let bytes = response.bytes().await?;
    let error_response: ErrorResponseBody = serde_json::from_slice(&bytes).unwrap_or_default();

    let message = error_response
        .message
        .filter(|m| !m.is_empty())
        .or(error_response.error)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string());

    Ok(ApiError {
        status: status.as_u16(),
        message,
        correlation_id,
        body: (!bytes.is_empty()).then(|| String::from_utf8_lossy(&bytes).into_owned()),
    })
}
