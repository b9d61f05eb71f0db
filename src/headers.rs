//! Tracing and customer headers attached to every request.

use crate::common::{
    CORRELATION_ID_HEADER, CUSTOMER_IP_HEADER, CUSTOMER_USER_AGENT_HEADER, IDEMPOTENCY_KEY_HEADER,
    REQUEST_ID_HEADER,
};
use reqwest_middleware::RequestBuilder;
use uuid::Uuid;

/// Optional headers for a single logical operation.
///
/// Missing `request-id`, `x-correlation-id` and, for creations, `idempotency-key` values are
/// generated once when the request is built. Retries replay the same request, so every attempt
/// carries the same identifiers and the server can deduplicate creations that succeeded
/// despite a failure observed by the client.
///
/// ```rust
/// # use blink_debit::RequestHeaders;
/// let headers = RequestHeaders::new()
///     .with_correlation_id("my-correlation-id")
///     .with_customer_ip("192.168.0.1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub request_id: Option<String>,
    pub correlation_id: Option<String>,
    pub customer_ip: Option<String>,
    pub customer_user_agent: Option<String>,
    pub idempotency_key: Option<String>,
}

impl RequestHeaders {
    /// Creates an empty set of headers. All identifiers will be generated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_customer_ip(mut self, customer_ip: impl Into<String>) -> Self {
        self.customer_ip = Some(customer_ip.into());
        self
    }

    pub fn with_customer_user_agent(mut self, customer_user_agent: impl Into<String>) -> Self {
        self.customer_user_agent = Some(customer_user_agent.into());
        self
    }

    pub fn with_idempotency_key(mut self, idempotency_key: impl Into<String>) -> Self {
        self.idempotency_key = Some(idempotency_key.into());
        self
    }

    /// Returns a copy of these headers with every missing identifier generated.
    pub(crate) fn resolve(&self, with_idempotency_key: bool) -> RequestHeaders {
        RequestHeaders {
            request_id: Some(self.request_id.clone().unwrap_or_else(new_id)),
            correlation_id: Some(self.correlation_id.clone().unwrap_or_else(new_id)),
            customer_ip: self.customer_ip.clone(),
            customer_user_agent: self.customer_user_agent.clone(),
            idempotency_key: if with_idempotency_key {
                Some(self.idempotency_key.clone().unwrap_or_else(new_id))
            } else {
                None
            },
        }
    }

    /// Attaches these headers to a request, generating the missing identifiers.
    pub(crate) fn apply(
        &self,
        mut builder: RequestBuilder,
        with_idempotency_key: bool,
    ) -> RequestBuilder {
        let resolved = self.resolve(with_idempotency_key);

        for (name, value) in [
            (REQUEST_ID_HEADER, resolved.request_id),
            (CORRELATION_ID_HEADER, resolved.correlation_id),
            (CUSTOMER_IP_HEADER, resolved.customer_ip),
            (CUSTOMER_USER_AGENT_HEADER, resolved.customer_user_agent),
            (IDEMPOTENCY_KEY_HEADER, resolved.idempotency_key),
        ] {
            if let Some(value) = value {
                builder = builder.header(name, value);
            }
        }

        builder
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
