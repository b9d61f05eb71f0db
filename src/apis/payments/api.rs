use crate::{
    apis::{
        payments::{Payment, PaymentRequest, PaymentResponse},
        require_id, BlinkDebitClientInner, BlinkResponse,
    },
    pollable::{await_terminal, PollMode, PollOptions},
    Error, RequestHeaders,
};
use std::sync::Arc;
use urlencoding::encode;

/// Blink Debit payments APIs client.
#[derive(Clone, Debug)]
pub struct PaymentsApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl PaymentsApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Creates a payment against an authorised consent.
    pub async fn create(
        &self,
        request: &PaymentRequest,
        headers: &RequestHeaders,
    ) -> Result<PaymentResponse, Error> {
        Ok(self.create_response(request, headers).await?.data)
    }

    #[tracing::instrument(
        name = "Create Payment",
        skip(self, request, headers),
        fields(consent_id = %request.consent_id)
    )]
    pub async fn create_response(
        &self,
        request: &PaymentRequest,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<PaymentResponse>, Error> {
        request.validate()?;

        let res = headers
            .apply(
                self.inner.client.post(self.inner.api_url("/payments")?),
                true,
            )
            .json(request)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Gets the details of an existing payment.
    pub async fn get(&self, payment_id: &str, headers: &RequestHeaders) -> Result<Payment, Error> {
        Ok(self.get_response(payment_id, headers).await?.data)
    }

    #[tracing::instrument(name = "Get Payment", skip(self, headers))]
    pub async fn get_response(
        &self,
        payment_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<Payment>, Error> {
        require_id(payment_id, "Payment ID")?;

        let res = headers
            .apply(
                self.inner
                    .client
                    .get(self.inner.api_url(&format!("/payments/{}", encode(payment_id)))?),
                false,
            )
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Polls a payment until its settlement completes.
    ///
    /// Payments cannot be revoked, so nothing is cancelled when the client gives up waiting.
    #[tracing::instrument(name = "Await Successful Payment", skip(self, options))]
    pub async fn await_successful(
        &self,
        payment_id: &str,
        options: PollOptions,
        mode: PollMode,
    ) -> Result<Payment, Error> {
        require_id(payment_id, "Payment ID")?;
        let headers = RequestHeaders::default();

        await_terminal(
            payment_id,
            options,
            mode,
            || self.get(payment_id, &headers),
            None,
        )
        .await
    }
}
