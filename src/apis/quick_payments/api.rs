use crate::{
    apis::{
        quick_payments::{CreateQuickPaymentResponse, QuickPaymentRequest, QuickPaymentResponse},
        require_id, BlinkDebitClientInner, BlinkResponse,
    },
    pollable::{await_terminal, PollMode, PollOptions},
    Error, RequestHeaders,
};
use std::sync::Arc;
use urlencoding::encode;

/// Blink Debit quick payments APIs client.
#[derive(Clone, Debug)]
pub struct QuickPaymentsApi {
    inner: Arc<BlinkDebitClientInner>,
}

impl QuickPaymentsApi {
    pub(crate) fn new(inner: Arc<BlinkDebitClientInner>) -> Self {
        Self { inner }
    }

    /// Creates a new quick payment.
    pub async fn create(
        &self,
        request: &QuickPaymentRequest,
        headers: &RequestHeaders,
    ) -> Result<CreateQuickPaymentResponse, Error> {
        Ok(self.create_response(request, headers).await?.data)
    }

    #[tracing::instrument(
        name = "Create Quick Payment",
        skip(self, request, headers),
        fields(amount = %request.amount.total, currency = %request.amount.currency)
    )]
    pub async fn create_response(
        &self,
        request: &QuickPaymentRequest,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<CreateQuickPaymentResponse>, Error> {
        request.validate()?;

        let res = headers
            .apply(
                self.inner.client.post(self.inner.api_url("/quick-payments")?),
                true,
            )
            .json(request)
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Gets the details of an existing quick payment, including its consent.
    pub async fn get(
        &self,
        quick_payment_id: &str,
        headers: &RequestHeaders,
    ) -> Result<QuickPaymentResponse, Error> {
        Ok(self.get_response(quick_payment_id, headers).await?.data)
    }

    #[tracing::instrument(name = "Get Quick Payment", skip(self, headers))]
    pub async fn get_response(
        &self,
        quick_payment_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<QuickPaymentResponse>, Error> {
        require_id(quick_payment_id, "Quick payment ID")?;

        let res = headers
            .apply(
                self.inner.client.get(
                    self.inner
                        .api_url(&format!("/quick-payments/{}", encode(quick_payment_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        BlinkResponse::from_json(res).await
    }

    /// Revokes an existing quick payment.
    pub async fn revoke(
        &self,
        quick_payment_id: &str,
        headers: &RequestHeaders,
    ) -> Result<(), Error> {
        self.revoke_response(quick_payment_id, headers).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Revoke Quick Payment", skip(self, headers))]
    pub async fn revoke_response(
        &self,
        quick_payment_id: &str,
        headers: &RequestHeaders,
    ) -> Result<BlinkResponse<()>, Error> {
        require_id(quick_payment_id, "Quick payment ID")?;

        let res = headers
            .apply(
                self.inner.client.delete(
                    self.inner
                        .api_url(&format!("/quick-payments/{}", encode(quick_payment_id)))?,
                ),
                false,
            )
            .send()
            .await?;

        Ok(BlinkResponse::empty(res))
    }

    /// Polls a quick payment until its consent is authorised or consumed.
    ///
    /// The quick payment is revoked if it is still pending when the client gives up waiting.
    #[tracing::instrument(name = "Await Successful Quick Payment", skip(self, options))]
    pub async fn await_successful(
        &self,
        quick_payment_id: &str,
        options: PollOptions,
        mode: PollMode,
    ) -> Result<QuickPaymentResponse, Error> {
        require_id(quick_payment_id, "Quick payment ID")?;
        let headers = RequestHeaders::default();

        await_terminal(
            quick_payment_id,
            options,
            mode,
            || self.get(quick_payment_id, &headers),
            Some(Box::pin(self.revoke(quick_payment_id, &headers))),
        )
        .await
    }
}
