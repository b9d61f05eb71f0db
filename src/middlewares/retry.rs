use crate::{
    authenticator::Authenticator,
    common::{IDEMPOTENCY_KEY_HEADER, REQUEST_ID_HEADER},
    error::Error,
    middlewares::error_handling::{api_error_from_response, correlation_id},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use retry_policies::{RetryDecision, RetryPolicy};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
    time::Duration,
};
use task_local_extensions::Extensions;

/// Maximum number of retries of a transient failure, on top of the first attempt.
pub const MAX_RETRIES: u32 = 2;

/// Default retry schedule: one second before the first retry, five before the second.
///
/// ```rust
/// # use blink_debit::BlinkRetryPolicy;
/// # use retry_policies::{RetryDecision, RetryPolicy};
/// let policy = BlinkRetryPolicy::default();
/// assert!(matches!(policy.should_retry(1), RetryDecision::Retry { .. }));
/// assert!(matches!(policy.should_retry(2), RetryDecision::DoNotRetry));
/// ```
#[derive(Debug, Clone)]
pub struct BlinkRetryPolicy {
    delays: Vec<Duration>,
}

impl BlinkRetryPolicy {
    /// Builds a policy that retries once per entry of `delays`, waiting the given time before each retry.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }
}

impl Default for BlinkRetryPolicy {
    fn default() -> Self {
        Self::new(vec![Duration::from_millis(1000), Duration::from_millis(5000)])
    }
}

impl RetryPolicy for BlinkRetryPolicy {
    fn should_retry(&self, n_past_retries: u32) -> RetryDecision {
        match self.delays.get(n_past_retries as usize) {
            Some(delay) => RetryDecision::Retry {
                execute_after: Utc::now()
                    + chrono::Duration::from_std(*delay).unwrap_or_else(|_| chrono::Duration::zero()),
            },
            None => RetryDecision::DoNotRetry,
        }
    }
}

/// Wrapper type around a retry policy because `dyn RetryPolicy` does not implement `RetryPolicy`.
#[derive(Clone)]
pub struct DynRetryPolicy(pub Arc<dyn RetryPolicy + Send + Sync + 'static>);

impl RetryPolicy for DynRetryPolicy {
    fn should_retry(&self, n_past_retries: u32) -> RetryDecision {
        self.0.should_retry(n_past_retries)
    }
}

impl Debug for DynRetryPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynRetryPolicy").finish_non_exhaustive()
    }
}

/// Middleware that retries transient failures and recovers from expired access tokens.
///
/// Only idempotent requests are retried. A request is considered idempotent if and only if:
/// - Has an idempotent method (`GET`, `HEAD`, `OPTIONS`, `TRACE`, `PUT` or `DELETE`), or
/// - Has a `POST` or `PATCH` method *and* an `idempotency-key` header set.
///
/// Every attempt sends an identical copy of the original request, so the tracing and
/// idempotency headers stay the same across retries.
///
/// | Outcome | Action |
/// |---|---|
/// | network error, 429, 5xx | retry while the policy allows it |
/// | 401 on the first attempt | refresh the access token and retry once, outside of the retry budget |
/// | any other 4xx | no retry |
///
/// When the policy gives up, the last failure is wrapped in an [`Error::Service`](crate::Error::Service).
pub struct RetryMiddleware {
    retry_policy: DynRetryPolicy,
    authenticator: Authenticator,
}

impl RetryMiddleware {
    pub fn new(retry_policy: DynRetryPolicy, authenticator: Authenticator) -> Self {
        Self {
            retry_policy,
            authenticator,
        }
    }
}

/// State shared by all the attempts of one logical operation.
#[derive(Debug)]
struct RetryContext {
    attempt_number: u32,
    reauthenticated: bool,
    request_id: Option<String>,
    correlation_id: Option<String>,
    idempotency_key: Option<String>,
}

impl RetryContext {
    fn new(req: &Request) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        Self {
            attempt_number: 0,
            reauthenticated: false,
            request_id: header(REQUEST_ID_HEADER),
            correlation_id: correlation_id(req),
            idempotency_key: header(IDEMPOTENCY_KEY_HEADER),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Classification {
    Done,
    Reauthenticate,
    Transient,
    Fatal,
}

fn classify(result: &reqwest_middleware::Result<Response>) -> Classification {
    match result {
        Ok(res) if res.status().is_success() => Classification::Done,
        Ok(res) => match res.status() {
            StatusCode::UNAUTHORIZED => Classification::Reauthenticate,
            StatusCode::TOO_MANY_REQUESTS => Classification::Transient,
            status if status.is_server_error() => Classification::Transient,
            _ => Classification::Fatal,
        },
        Err(reqwest_middleware::Error::Reqwest(e)) if !e.is_builder() => Classification::Transient,
        Err(_) => Classification::Fatal,
    }
}

fn is_idempotent(req: &Request) -> bool {
    match *req.method() {
        Method::GET
        | Method::HEAD
        | Method::OPTIONS
        | Method::TRACE
        | Method::PUT
        | Method::DELETE => true,
        Method::POST | Method::PATCH => req
            .headers()
            .get(IDEMPOTENCY_KEY_HEADER)
            .map_or(false, |v| !v.is_empty()),
        _ => false,
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        // Streaming bodies cannot be replayed
        if !is_idempotent(&req) || req.try_clone().is_none() {
            return next.run(req, extensions).await;
        }

        let mut ctx = RetryContext::new(&req);

        loop {
            let attempt = req.try_clone().ok_or_else(|| Error::Service {
                message: "Request cannot be cloned for retrying".to_string(),
                source: None,
            })?;
            let result = next.clone().run(attempt, extensions).await;

            match classify(&result) {
                Classification::Done | Classification::Fatal => return result,
                Classification::Reauthenticate => {
                    if ctx.reauthenticated || ctx.attempt_number > 0 {
                        return result;
                    }

                    tracing::debug!(
                        request_id = ?ctx.request_id,
                        correlation_id = ?ctx.correlation_id,
                        "Access token rejected, refreshing it before trying again"
                    );
                    ctx.reauthenticated = true;
                    self.authenticator.get_access_token(true).await?;
                }
                Classification::Transient => {
                    match self.retry_policy.should_retry(ctx.attempt_number) {
                        RetryDecision::Retry { execute_after } => {
                            let wait_time = (execute_after - Utc::now()).to_std().unwrap_or_default();

                            tracing::debug!(
                                attempt = ctx.attempt_number + 1,
                                request_id = ?ctx.request_id,
                                correlation_id = ?ctx.correlation_id,
                                idempotency_key = ?ctx.idempotency_key,
                                "Transient failure, retrying in {} ms",
                                wait_time.as_millis()
                            );

                            tokio::time::sleep(wait_time).await;
                            ctx.attempt_number += 1;
                        }
                        RetryDecision::DoNotRetry => {
                            return Err(retries_exhausted(&ctx, result).await.into());
                        }
                    }
                }
            }
        }
    }
}

async fn retries_exhausted(
    ctx: &RetryContext,
    result: reqwest_middleware::Result<Response>,
) -> Error {
    // HTTP requests actually sent, including the one answered by a 401 before re-authenticating
    let attempts = ctx.attempt_number + 1 + u32::from(ctx.reauthenticated);

    match result {
        Ok(response) => {
            let status = response.status();
            let cause = match api_error_from_response(response, ctx.correlation_id.clone()).await
            {
                Ok(api_error) => Error::from(api_error),
                Err(e) => Error::from(e),
            };
            Error::service(
                format!(
                    "Retry attempts exhausted after {} attempts: HTTP status {}",
                    attempts, status
                ),
                cause,
            )
        }
        Err(e) => Error::service(
            format!(
                "Retry attempts exhausted after {} attempts: {}",
                attempts, e
            ),
            Error::from(e),
        ),
    }
}
