//! Standard errors used by all functions in the crate.

use std::fmt;

/// Boxed error used as the inner cause of wrapping variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error collecting all possible failures of the Blink Debit client.
///
/// HTTP failures are classified by status code:
///
/// | Status | Variant |
/// |---|---|
/// | 401, 422 | [`Unauthorised`](Error::Unauthorised) |
/// | 403 | [`Forbidden`](Error::Forbidden) |
/// | 404 | [`ResourceNotFound`](Error::ResourceNotFound) |
/// | 408 | [`Retryable`](Error::Retryable) |
/// | 429 | [`RateLimitExceeded`](Error::RateLimitExceeded) |
/// | 501 | [`NotImplemented`](Error::NotImplemented) |
/// | 502 | [`Service`](Error::Service) |
/// | other 4xx | [`Client`](Error::Client) |
/// | other 5xx | [`Retryable`](Error::Retryable) |
/// | anything else | [`Service`](Error::Service) |
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Catch-all variant. Carries the original failure as its source when wrapping one.
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// The credentials were rejected, or the server refused the request as unauthorised.
    #[error("Unauthorised: {0}")]
    Unauthorised(ApiError),
    /// The credentials are valid but not allowed to perform this operation.
    #[error("Forbidden: {0}")]
    Forbidden(ApiError),
    /// The requested resource does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(ApiError),
    /// Too many requests were sent in a given amount of time.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(ApiError),
    /// Transient server-side failure.
    #[error("Retryable error: {0}")]
    Retryable(ApiError),
    /// Any other client error returned by the API.
    #[error("Client error: {0}")]
    Client(ApiError),
    /// The operation is not supported by the API yet.
    #[error("Not implemented: {0}")]
    NotImplemented(ApiError),
    /// Invalid input supplied by the caller. Raised before any request is sent.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// The consent was rejected or revoked.
    #[error("{0}")]
    ConsentRejected(String),
    /// The consent was not authorised in time.
    ///
    /// When the client gave up waiting and the best-effort revoke failed as well,
    /// the revoke failure is available as the source of this error.
    #[error("{message}")]
    ConsentTimeout {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },
    /// The payment was rejected.
    #[error("{0}")]
    PaymentRejected(String),
    /// The payment did not complete in time.
    #[error("{message}")]
    PaymentTimeout {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },
}

impl Error {
    /// Builds a [`Service`](Error::Service) error wrapping the given cause.
    pub fn service(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Service {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the [`ApiError`] behind this error, if the failure came from an HTTP response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Unauthorised(e)
            | Error::Forbidden(e)
            | Error::ResourceNotFound(e)
            | Error::RateLimitExceeded(e)
            | Error::Retryable(e)
            | Error::Client(e)
            | Error::NotImplemented(e) => Some(e),
            Error::Service {
                source: Some(source),
                ..
            } => source.downcast_ref::<ApiError>().or_else(|| {
                source
                    .downcast_ref::<Error>()
                    .and_then(|e| e.api_error())
            }),
            _ => None,
        }
    }

    /// HTTP status code of the response that caused this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        match e.status {
            401 | 422 => Error::Unauthorised(e),
            403 => Error::Forbidden(e),
            404 => Error::ResourceNotFound(e),
            408 => Error::Retryable(e),
            429 => Error::RateLimitExceeded(e),
            501 => Error::NotImplemented(e),
            502 => Error::Service {
                message: format!(
                    "Service call to Blink Debit failed with error: {}, please contact BlinkPay with the correlation ID: {}",
                    e.message,
                    e.correlation_id.as_deref().unwrap_or("unknown")
                ),
                source: Some(Box::new(e)),
            },
            400..=499 => Error::Client(e),
            500..=599 => Error::Retryable(e),
            status => Error::Service {
                message: format!("Unexpected HTTP status {} from Blink Debit", status),
                source: Some(Box::new(e)),
            },
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::service(format!("HTTP error: {}", e), e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::service(format!("Invalid JSON: {}", e), e)
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => Error::from(e),
            reqwest_middleware::Error::Middleware(e) => match e.downcast::<Error>() {
                Ok(e) => e,
                Err(e) => Error::Service {
                    message: e.to_string(),
                    source: Some(e.into()),
                },
            },
        }
    }
}

impl From<Error> for reqwest_middleware::Error {
    fn from(e: Error) -> Self {
        reqwest_middleware::Error::Middleware(e.into())
    }
}

/// Blink Debit HTTP APIs error.
#[derive(thiserror::Error, Debug, Clone)]
pub struct ApiError {
    /// HTTP status returned by the server.
    pub status: u16,
    /// Concise description of the error, taken from the response body when available.
    pub message: String,
    /// The correlation ID sent with the failed request.
    pub correlation_id: Option<String>,
    /// Raw response body.
    pub body: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Blink Debit HTTP error {}: {}",
            self.status, self.message
        )?;

        if let Some(ref correlation_id) = self.correlation_id {
            write!(f, "\nCorrelation ID: {}", correlation_id)?;
        }

        Ok(())
    }
}
