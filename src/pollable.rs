//! Common logic to wait for consents and payments to reach a terminal state.

use crate::{
    apis::{
        consents::{Consent, ConsentDetail},
        payments::{Payment, PaymentResponse},
        quick_payments::{CreateQuickPaymentResponse, QuickPaymentResponse},
    },
    BlinkDebitClient, Error, RequestHeaders,
};
use async_trait::async_trait;
use std::{future::Future, pin::Pin, time::Duration};

/// Best-effort cancellation issued when the client gives up waiting.
pub type RevokeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// Options to configure how long to wait for a resource.
///
/// `max_wait_seconds` is the number of status checks, made one second apart.
/// Slow responses can make the total wait longer.
#[derive(Debug, Clone)]
pub struct PollOptions {
    max_wait_seconds: u32,
    interval: Duration,
}

impl PollOptions {
    pub fn new(max_wait_seconds: u32) -> Self {
        Self {
            max_wait_seconds,
            interval: Duration::from_secs(1),
        }
    }

    /// Sets the time between two status checks.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_wait_seconds(&self) -> u32 {
        self.max_wait_seconds
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// How failures are reported once polling stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Every unsuccessful outcome is reported as a timeout of the resource.
    /// The precise error is available as its source.
    Simple,
    /// Rejections, gateway timeouts and client timeouts are reported as distinct errors.
    Precise,
}

/// Classification of one snapshot of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Success,
    Pending,
    Rejected { status: String },
    GatewayTimeout,
}

/// Family of a polled resource, which decides the errors raised when polling fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Consent,
    QuickPayment,
    Payment,
}

impl ResourceKind {
    fn name(self) -> &'static str {
        match self {
            ResourceKind::Consent => "Consent",
            ResourceKind::QuickPayment => "Quick payment",
            ResourceKind::Payment => "Payment",
        }
    }

    fn rejected(self, resource_id: &str, status: &str) -> Error {
        let message = format!(
            "{} [{}] has been rejected or revoked (status: {})",
            self.name(),
            resource_id,
            status
        );

        match self {
            ResourceKind::Consent | ResourceKind::QuickPayment => Error::ConsentRejected(message),
            ResourceKind::Payment => Error::PaymentRejected(message),
        }
    }

    fn timeout(self, message: String, source: Option<Error>) -> Error {
        let source = source.map(Box::new);

        match self {
            ResourceKind::Consent | ResourceKind::QuickPayment => {
                Error::ConsentTimeout { message, source }
            }
            ResourceKind::Payment => Error::PaymentTimeout { message, source },
        }
    }
}

/// A resource whose status can be classified into a [`PollStatus`].
pub trait Classify {
    const KIND: ResourceKind;

    fn poll_status(&self) -> PollStatus;
}

/// Fetches a resource every [`PollOptions::interval`] until it reaches a terminal state.
///
/// - A successful snapshot is returned straight away.
/// - A rejected snapshot fails with [`Error::ConsentRejected`] or [`Error::PaymentRejected`].
/// - A gateway timeout fails with [`Error::ConsentTimeout`].
/// - When every attempt found the resource pending, `on_timeout_revoke` runs once and the call
///   fails with [`Error::ConsentTimeout`] or [`Error::PaymentTimeout`]. A failed revoke becomes
///   the source of the timeout error.
///
/// Errors returned by `fetch_status` are propagated unchanged.
pub async fn await_terminal<T, F, Fut>(
    resource_id: &str,
    options: PollOptions,
    mode: PollMode,
    mut fetch_status: F,
    on_timeout_revoke: Option<RevokeFuture<'_>>,
) -> Result<T, Error>
where
    T: Classify,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    if options.max_wait_seconds == 0 {
        return Err(Error::InvalidValue(
            "Maximum wait time must be at least one second".to_string(),
        ));
    }

    let kind = T::KIND;
    let fail = |precise: Error| match mode {
        PollMode::Precise => precise,
        PollMode::Simple => match precise {
            e @ (Error::ConsentTimeout { .. } | Error::PaymentTimeout { .. }) => e,
            e => kind.timeout(
                format!(
                    "{} [{}] did not complete successfully: {}",
                    kind.name(),
                    resource_id,
                    e
                ),
                Some(e),
            ),
        },
    };

    for attempt in 1..=options.max_wait_seconds {
        let resource = fetch_status().await?;

        match resource.poll_status() {
            PollStatus::Success => {
                tracing::debug!(attempt, "{} [{}] completed", kind.name(), resource_id);
                return Ok(resource);
            }
            PollStatus::Rejected { status } => {
                return Err(fail(kind.rejected(resource_id, &status)));
            }
            PollStatus::GatewayTimeout => {
                return Err(fail(kind.timeout(
                    format!("Gateway timed out for {} [{}]", kind.name(), resource_id),
                    None,
                )));
            }
            PollStatus::Pending => {
                tracing::debug!(
                    attempt,
                    max_attempts = options.max_wait_seconds,
                    "{} [{}] is still pending",
                    kind.name(),
                    resource_id
                );

                if attempt < options.max_wait_seconds {
                    tokio::time::sleep(options.interval).await;
                }
            }
        }
    }

    let message = format!(
        "{} [{}] did not complete within {} seconds",
        kind.name(),
        resource_id,
        options.max_wait_seconds
    );

    let revoke_error = match on_timeout_revoke {
        Some(revoke) => match revoke.await {
            Ok(()) => {
                tracing::info!("{} [{}] revoked after timing out", kind.name(), resource_id);
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to revoke {} [{}] after timing out",
                    kind.name(),
                    resource_id
                );
                Some(e)
            }
        },
        None => None,
    };

    Err(fail(kind.timeout(message, revoke_error)))
}

/// A resource that can be continuously polled for updates.
#[async_trait]
pub trait Pollable: private::Sealed + Sync {
    type Output: Classify + Send;

    fn resource_id(&self) -> &str;

    /// Makes a single request to retrieve the most up-to-date version of this resource from the server.
    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<Self::Output, Error>;

    /// Cancellation to attempt when polling gives up. Nothing is revoked by default.
    fn revoke_on_timeout<'a>(&'a self, _client: &'a BlinkDebitClient) -> Option<RevokeFuture<'a>> {
        None
    }

    /// Continuously polls the server until this resource reaches a terminal state.
    ///
    /// See [`await_terminal`](crate::pollable::await_terminal) for the possible outcomes.
    #[tracing::instrument(name = "Poll until terminal state", skip_all)]
    async fn poll_until_terminal_state(
        &self,
        client: &BlinkDebitClient,
        options: PollOptions,
        mode: PollMode,
    ) -> Result<Self::Output, Error> {
        await_terminal(
            self.resource_id(),
            options,
            mode,
            || self.poll_once(client),
            self.revoke_on_timeout(client),
        )
        .await
    }
}

#[async_trait]
impl Pollable for Consent {
    type Output = Consent;

    fn resource_id(&self) -> &str {
        &self.consent_id
    }

    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<Consent, Error> {
        match self.detail {
            ConsentDetail::Single(_) => {
                client
                    .single_consents
                    .get(&self.consent_id, &RequestHeaders::default())
                    .await
            }
            ConsentDetail::Enduring(_) => {
                client
                    .enduring_consents
                    .get(&self.consent_id, &RequestHeaders::default())
                    .await
            }
        }
    }

    fn revoke_on_timeout<'a>(&'a self, client: &'a BlinkDebitClient) -> Option<RevokeFuture<'a>> {
        Some(Box::pin(async move {
            let headers = RequestHeaders::default();
            match self.detail {
                ConsentDetail::Single(_) => {
                    client.single_consents.revoke(&self.consent_id, &headers).await
                }
                ConsentDetail::Enduring(_) => {
                    client.enduring_consents.revoke(&self.consent_id, &headers).await
                }
            }
        }))
    }
}

#[async_trait]
impl Pollable for CreateQuickPaymentResponse {
    type Output = QuickPaymentResponse;

    fn resource_id(&self) -> &str {
        &self.quick_payment_id
    }

    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<QuickPaymentResponse, Error> {
        client
            .quick_payments
            .get(&self.quick_payment_id, &RequestHeaders::default())
            .await
    }

    fn revoke_on_timeout<'a>(&'a self, client: &'a BlinkDebitClient) -> Option<RevokeFuture<'a>> {
        Some(Box::pin(async move {
            client
                .quick_payments
                .revoke(&self.quick_payment_id, &RequestHeaders::default())
                .await
        }))
    }
}

#[async_trait]
impl Pollable for QuickPaymentResponse {
    type Output = QuickPaymentResponse;

    fn resource_id(&self) -> &str {
        &self.quick_payment_id
    }

    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<QuickPaymentResponse, Error> {
        client
            .quick_payments
            .get(&self.quick_payment_id, &RequestHeaders::default())
            .await
    }

    fn revoke_on_timeout<'a>(&'a self, client: &'a BlinkDebitClient) -> Option<RevokeFuture<'a>> {
        Some(Box::pin(async move {
            client
                .quick_payments
                .revoke(&self.quick_payment_id, &RequestHeaders::default())
                .await
        }))
    }
}

#[async_trait]
impl Pollable for PaymentResponse {
    type Output = Payment;

    fn resource_id(&self) -> &str {
        &self.payment_id
    }

    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<Payment, Error> {
        client
            .payments
            .get(&self.payment_id, &RequestHeaders::default())
            .await
    }
}

#[async_trait]
impl Pollable for Payment {
    type Output = Payment;

    fn resource_id(&self) -> &str {
        &self.payment_id
    }

    async fn poll_once(&self, client: &BlinkDebitClient) -> Result<Payment, Error> {
        client
            .payments
            .get(&self.payment_id, &RequestHeaders::default())
            .await
    }
}

// Prevent users from implementing the `Pollable` trait.
mod private {
    pub trait Sealed {}

    impl Sealed for crate::apis::consents::Consent {}
    impl Sealed for crate::apis::quick_payments::CreateQuickPaymentResponse {}
    impl Sealed for crate::apis::quick_payments::QuickPaymentResponse {}
    impl Sealed for crate::apis::payments::PaymentResponse {}
    impl Sealed for crate::apis::payments::Payment {}
}
